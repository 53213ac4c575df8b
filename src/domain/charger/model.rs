//! Charger domain entity

use chrono::{DateTime, Utc};

use crate::domain::pricing::{calculate_booking_cost, CostBreakdown};
use crate::domain::DomainResult;

/// Physical connector on the charger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    J1772,
    Ccs,
    TeslaNacs,
    Chademo,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::J1772 => "J1772",
            Self::Ccs => "CCS",
            Self::TeslaNacs => "Tesla NACS",
            Self::Chademo => "CHAdeMO",
        }
    }

    /// Parse a connector label; unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "J1772" => Some(Self::J1772),
            "CCS" => Some(Self::Ccs),
            "Tesla NACS" | "NACS" => Some(Self::TeslaNacs),
            "CHAdeMO" => Some(Self::Chademo),
            _ => None,
        }
    }

    pub fn all() -> [ConnectorType; 4] {
        [Self::J1772, Self::Ccs, Self::TeslaNacs, Self::Chademo]
    }
}

impl std::fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A charger listed by a host
#[derive(Debug, Clone, PartialEq)]
pub struct Charger {
    pub id: String,
    pub host_id: String,
    /// Host display name, denormalized for browse search
    pub host_name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub connector: ConnectorType,
    pub power_kw: f64,
    pub price_per_kwh: f64,
    /// Flat fee charged once per booking
    pub access_fee: f64,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub description: String,
    /// Host-controlled listing toggle; inactive chargers cannot be booked
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Charger {
    /// Cost of booking this charger for `duration_hours`.
    pub fn quote(&self, duration_hours: f64) -> DomainResult<CostBreakdown> {
        calculate_booking_cost(self.price_per_kwh, self.power_kw, self.access_fee, duration_hours)
    }

    pub fn is_hosted_by(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    /// Case-insensitive match against address, city and host name.
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.address.to_lowercase().contains(&q)
            || self.city.to_lowercase().contains(&q)
            || self.host_name.to_lowercase().contains(&q)
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_charger() -> Charger {
        Charger {
            id: "c-1".into(),
            host_id: "h-1".into(),
            host_name: "Sarah Johnson".into(),
            address: "123 Oak Street".into(),
            city: "Palo Alto".into(),
            state: Some("CA".into()),
            zip_code: Some("94301".into()),
            latitude: 37.4419,
            longitude: -122.143,
            connector: ConnectorType::J1772,
            power_kw: 9.6,
            price_per_kwh: 0.18,
            access_fee: 2.0,
            amenities: vec!["WiFi".into()],
            photos: vec![],
            description: "Covered driveway".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn connector_labels_roundtrip() {
        for c in ConnectorType::all() {
            assert_eq!(ConnectorType::parse(c.as_str()), Some(c));
        }
        assert_eq!(ConnectorType::parse("Type 2"), None);
    }

    #[test]
    fn search_matches_address_city_and_host() {
        let c = sample_charger();
        assert!(c.matches_search("oak"));
        assert!(c.matches_search("PALO"));
        assert!(c.matches_search("sarah"));
        assert!(c.matches_search("  "));
        assert!(!c.matches_search("seattle"));
    }

    #[test]
    fn quote_uses_charger_rates() {
        let c = sample_charger();
        let q = c.quote(1.0).unwrap();
        assert!((q.energy_cost - 1.728).abs() < 1e-9);
        assert_eq!(q.access_fee, 2.0);
    }

    #[test]
    fn toggle_listing() {
        let mut c = sample_charger();
        c.set_active(false);
        assert!(!c.is_active);
        assert!(c.is_hosted_by("h-1"));
        assert!(!c.is_hosted_by("u-2"));
    }
}
