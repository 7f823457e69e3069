use super::{Entity, Record, RecordSource};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Felipe", "Gabriela", "Hugo", "Isabela", "João",
    "Karina", "Lucas", "Mariana", "Nicolas", "Olivia", "Pedro", "Rafaela", "Samuel", "Tatiana",
    "Vitor",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Santos", "Oliveira", "Souza", "Rodrigues", "Ferreira", "Alves", "Pereira", "Lima",
    "Gomes", "Costa", "Ribeiro", "Martins", "Carvalho", "Almeida",
];

const CITIES: &[(&str, &str, &str)] = &[
    ("São Paulo", "Brazil", "America/Sao_Paulo"),
    ("Rio de Janeiro", "Brazil", "America/Sao_Paulo"),
    ("Belo Horizonte", "Brazil", "America/Sao_Paulo"),
    ("Lisbon", "Portugal", "Europe/Lisbon"),
    ("New York", "United States", "America/New_York"),
    ("San Francisco", "United States", "America/Los_Angeles"),
    ("London", "United Kingdom", "Europe/London"),
    ("Berlin", "Germany", "Europe/Berlin"),
];

const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella", "Stark Industries", "Wayne Enterprises",
    "Hooli", "Vandelay Industries",
];

const JOBS: &[&str] = &[
    "Data Engineer", "Software Engineer", "Product Manager", "Designer", "Accountant",
    "Sales Representative", "Nurse", "Teacher",
];

const GENDERS: &[&str] = &["female", "male", "non-binary"];

const RIDE_PRODUCTS: &[&str] = &["UberX", "Comfort", "Black", "Pool", "XL"];

const RIDE_STATUSES: &[&str] = &["completed", "cancelled", "in_progress", "requested"];

const CURRENCIES: &[&str] = &["BRL", "USD", "EUR", "GBP"];

const PAYMENT_METHODS: &[&str] = &["credit_card", "debit_card", "pix", "paypal", "apple_pay"];

const PAYMENT_PROVIDERS: &[&str] = &["stripe", "adyen", "paypal", "mercado_pago"];

const PAYMENT_STATUSES: &[&str] = &["succeeded", "pending", "failed", "refunded"];

const VEHICLE_MODELS: &[(&str, &str, &str)] = &[
    ("Toyota", "Corolla", "sedan"),
    ("Honda", "Civic", "sedan"),
    ("Volkswagen", "Gol", "hatchback"),
    ("Chevrolet", "Onix", "hatchback"),
    ("Hyundai", "Creta", "suv"),
    ("Jeep", "Compass", "suv"),
    ("Fiat", "Toro", "pickup"),
    ("Tesla", "Model 3", "sedan"),
];

const FUEL_TYPES: &[&str] = &["gasoline", "ethanol", "flex", "diesel", "electric", "hybrid"];

const COLORS: &[&str] = &["black", "white", "silver", "red", "blue", "gray"];

const TRANSMISSIONS: &[&str] = &["manual", "automatic", "cvt"];

const VIN_CHARS: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ0123456789";

/// Locally faked records for the users, rides, payments and vehicle entities
pub struct LocalRecords {
    rng: StdRng,
}

impl LocalRecords {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for reproducible batches
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn user(&mut self) -> Record {
        let first_name = pick(&mut self.rng, FIRST_NAMES);
        let last_name = pick(&mut self.rng, LAST_NAMES);
        let (city, country, time_zone) = pick(&mut self.rng, CITIES);
        let email = format!(
            "{}.{}{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            self.rng.gen_range(1..1000)
        );
        let age_days = self.rng.gen_range(18 * 365..80 * 365);
        let date_birth = (Utc::now() - Duration::days(age_days)).format("%Y-%m-%d");

        record([
            ("uuid", json!(Uuid::new_v4().to_string())),
            ("first_name", json!(first_name)),
            ("last_name", json!(last_name)),
            ("email", json!(email)),
            ("gender", json!(pick(&mut self.rng, GENDERS))),
            ("date_birth", json!(date_birth.to_string())),
            ("city", json!(city)),
            ("country", json!(country)),
            ("company_name", json!(pick(&mut self.rng, COMPANIES))),
            ("job", json!(pick(&mut self.rng, JOBS))),
            ("phone_number", json!(self.phone_number())),
            ("last_access_time", json!(self.recent_timestamp())),
            ("time_zone", json!(time_zone)),
        ])
    }

    fn ride(&mut self) -> Record {
        let distance_km = round2(self.rng.gen_range(0.8..45.0));
        let surge_multiplier = round2(self.rng.gen_range(1.0..2.5));
        let price = round2((3.5 + distance_km * 1.9) * surge_multiplier);
        let duration_min = (distance_km * self.rng.gen_range(1.5..4.0)).ceil() as i64;

        record([
            ("ride_id", json!(Uuid::new_v4().to_string())),
            ("driver_id", json!(self.rng.gen_range(1..5000))),
            ("passenger_id", json!(self.rng.gen_range(1..10000))),
            ("product", json!(pick(&mut self.rng, RIDE_PRODUCTS))),
            ("source_lat", json!(self.latitude())),
            ("source_lon", json!(self.longitude())),
            ("destination_lat", json!(self.latitude())),
            ("destination_lon", json!(self.longitude())),
            ("distance_km", json!(distance_km)),
            ("duration_min", json!(duration_min)),
            ("surge_multiplier", json!(surge_multiplier)),
            ("price", json!(price)),
            ("currency", json!(pick(&mut self.rng, CURRENCIES))),
            ("status", json!(pick(&mut self.rng, RIDE_STATUSES))),
            ("requested_at", json!(self.recent_timestamp())),
        ])
    }

    fn payment(&mut self) -> Record {
        record([
            ("payment_id", json!(Uuid::new_v4().to_string())),
            ("txn_id", json!(format!("txn_{:012}", self.rng.gen_range(0..1_000_000_000_000u64)))),
            ("amount", json!(round2(self.rng.gen_range(1.0..2500.0)))),
            ("currency", json!(pick(&mut self.rng, CURRENCIES))),
            ("payment_method", json!(pick(&mut self.rng, PAYMENT_METHODS))),
            ("provider", json!(pick(&mut self.rng, PAYMENT_PROVIDERS))),
            ("status", json!(pick(&mut self.rng, PAYMENT_STATUSES))),
            ("country", json!(pick(&mut self.rng, CITIES).1)),
            ("installments", json!(self.rng.gen_range(1..13))),
            ("created_at", json!(self.recent_timestamp())),
        ])
    }

    fn vehicle(&mut self) -> Record {
        let (make, model, vehicle_type) = pick(&mut self.rng, VEHICLE_MODELS);

        record([
            ("vehicle_id", json!(Uuid::new_v4().to_string())),
            ("make", json!(make)),
            ("model", json!(model)),
            ("year", json!(self.rng.gen_range(2005..2025))),
            ("vehicle_type", json!(vehicle_type)),
            ("fuel_type", json!(pick(&mut self.rng, FUEL_TYPES))),
            ("color", json!(pick(&mut self.rng, COLORS))),
            ("transmission", json!(pick(&mut self.rng, TRANSMISSIONS))),
            ("doors", json!(if vehicle_type == "pickup" { 2 } else { 4 })),
            ("license_plate", json!(self.license_plate())),
            ("vin", json!(self.vin())),
            ("mileage_km", json!(self.rng.gen_range(0..250_000))),
        ])
    }

    fn phone_number(&mut self) -> String {
        format!(
            "+55 {} 9{:04}-{:04}",
            self.rng.gen_range(11..99),
            self.rng.gen_range(0..10_000),
            self.rng.gen_range(0..10_000)
        )
    }

    fn recent_timestamp(&mut self) -> String {
        let offset = Duration::seconds(self.rng.gen_range(0..31_536_000));
        (Utc::now() - offset).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn latitude(&mut self) -> f64 {
        round6(self.rng.gen_range(-23.75..-23.45))
    }

    fn longitude(&mut self) -> f64 {
        round6(self.rng.gen_range(-46.85..-46.35))
    }

    fn license_plate(&mut self) -> String {
        // Mercosul layout: LLLNLNN
        let letter = |rng: &mut StdRng| (b'A' + rng.gen_range(0..26)) as char;
        let digit = |rng: &mut StdRng| (b'0' + rng.gen_range(0..10)) as char;
        [
            letter(&mut self.rng),
            letter(&mut self.rng),
            letter(&mut self.rng),
            digit(&mut self.rng),
            letter(&mut self.rng),
            digit(&mut self.rng),
            digit(&mut self.rng),
        ]
        .iter()
        .collect()
    }

    fn vin(&mut self) -> String {
        (0..17)
            .map(|_| VIN_CHARS[self.rng.gen_range(0..VIN_CHARS.len())] as char)
            .collect()
    }
}

impl Default for LocalRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSource for LocalRecords {
    fn records(&mut self, entity: Entity, rows: usize) -> Vec<Record> {
        (0..rows)
            .map(|_| match entity {
                Entity::Users => self.user(),
                Entity::Rides => self.ride(),
                Entity::Payments => self.payment(),
                Entity::Vehicle => self.vehicle(),
            })
            .collect()
    }
}

fn record<const N: usize>(fields: [(&str, Value); N]) -> Record {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn pick<T: Copy>(rng: &mut StdRng, pool: &[T]) -> T {
    pool[rng.gen_range(0..pool.len())]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn field_set(record: &Record) -> BTreeSet<String> {
        record.keys().cloned().collect()
    }

    #[test]
    fn test_generates_requested_row_count_with_uniform_shape() {
        let mut source = LocalRecords::with_seed(7);

        for entity in [Entity::Users, Entity::Rides, Entity::Payments, Entity::Vehicle] {
            let records = source.records(entity, 100);
            assert_eq!(records.len(), 100, "{entity:?}");

            let expected = field_set(&records[0]);
            assert!(!expected.is_empty());
            assert!(records.iter().all(|r| field_set(r) == expected), "{entity:?}");
        }
    }

    #[test]
    fn test_zero_rows() {
        let mut source = LocalRecords::with_seed(1);
        assert!(source.records(Entity::Users, 0).is_empty());
    }

    #[test]
    fn test_field_order_is_stable() {
        let mut source = LocalRecords::with_seed(3);
        let records = source.records(Entity::Vehicle, 2);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys[0], "vehicle_id");
        assert_eq!(keys[1], "make");
        assert_eq!(
            records[0].keys().collect::<Vec<_>>(),
            records[1].keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_value_shapes() {
        let mut source = LocalRecords::with_seed(11);

        let vehicle = &source.records(Entity::Vehicle, 1)[0];
        let plate = vehicle["license_plate"].as_str().unwrap();
        assert_eq!(plate.len(), 7);
        assert_eq!(vehicle["vin"].as_str().unwrap().len(), 17);

        let ride = &source.records(Entity::Rides, 1)[0];
        assert!(ride["distance_km"].is_f64());
        assert!(ride["driver_id"].is_i64());

        let user = &source.records(Entity::Users, 1)[0];
        assert!(user["email"].as_str().unwrap().ends_with("@example.com"));
    }
}
