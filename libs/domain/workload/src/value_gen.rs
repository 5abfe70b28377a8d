//! Produces type-appropriate random values from a column's declared
//! type and name, as a string literal ready to be cast to the target
//! type on the SQL side (`$n::<declared_type>`). Binding everything as
//! text and letting Postgres perform the cast sidesteps having to hand
//! a distinct `ToSql` implementation for every catalog type the
//! dynamic scenario might encounter.

use chrono::{Duration as ChronoDuration, Utc};
use fake::faker::address::en::{CityName, CountryName, StateName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{IPv4, SafeEmail, Username};
use fake::faker::job::en::Title as JobTitle;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use uuid::Uuid;

/// Case-insensitive substring patterns tried against the column name,
/// in order, before falling back to the declared type.
const NAME_PATTERNS: &[(&str, fn() -> String)] = &[
    ("email", gen_email),
    ("username", gen_username),
    ("user_name", gen_username),
    ("name", gen_full_name),
    ("phone", gen_phone),
    ("city", gen_city),
    ("state", gen_state),
    ("country", gen_country),
    ("zip", gen_zip),
    ("postal", gen_zip),
    ("company", gen_company),
    ("title", gen_job_title),
    ("url", gen_url),
    ("ip", gen_ip),
    ("user_agent", gen_user_agent),
    ("useragent", gen_user_agent),
    ("description", gen_description),
];

pub fn generate(column_type: &str, column_name: &str) -> String {
    let lowered_name = column_name.to_lowercase();
    for (pattern, generator) in NAME_PATTERNS {
        if lowered_name.contains(pattern) {
            return generator();
        }
    }
    generate_by_type(column_type)
}

fn generate_by_type(column_type: &str) -> String {
    let declared_type = column_type.to_lowercase();

    if declared_type.contains("char") || declared_type == "text" {
        return gen_description();
    }
    if is_integer_family(&declared_type) {
        return gen_integer(&declared_type);
    }
    if declared_type == "boolean" || declared_type == "bool" {
        return rand::thread_rng().gen_bool(0.5).to_string();
    }
    if declared_type.contains("float") || declared_type.contains("double") || declared_type.contains("real")
        || declared_type.contains("numeric") || declared_type.contains("decimal")
    {
        return format!("{:.2}", rand::thread_rng().gen_range(0.0..10_000.0));
    }
    if declared_type == "uuid" {
        return Uuid::new_v4().to_string();
    }
    if declared_type.contains("timestamp") {
        return gen_timestamp();
    }
    if declared_type == "date" {
        return gen_date();
    }
    if declared_type.contains("json") {
        return gen_json_object();
    }
    if declared_type == "bytea" {
        return gen_bytea();
    }
    if declared_type.contains("interval") {
        return gen_interval();
    }

    gen_description()
}

pub(crate) fn is_integer_family(declared_type: &str) -> bool {
    matches!(
        declared_type,
        "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" | "serial" | "bigserial" | "smallserial"
    )
}

fn gen_integer(declared_type: &str) -> String {
    let mut rng = rand::thread_rng();
    let value: i64 = match declared_type {
        "smallint" | "int2" | "smallserial" => rng.gen_range(0..i16::MAX as i64),
        "bigint" | "int8" | "bigserial" => rng.gen_range(0..1_000_000_000_i64),
        _ => rng.gen_range(0..i32::MAX as i64),
    };
    value.to_string()
}

fn gen_email() -> String {
    SafeEmail().fake()
}

fn gen_username() -> String {
    Username().fake()
}

fn gen_full_name() -> String {
    Name().fake()
}

fn gen_phone() -> String {
    PhoneNumber().fake()
}

fn gen_city() -> String {
    CityName().fake()
}

fn gen_state() -> String {
    StateName().fake()
}

fn gen_country() -> String {
    CountryName().fake()
}

fn gen_zip() -> String {
    ZipCode().fake()
}

fn gen_company() -> String {
    CompanyName().fake()
}

fn gen_job_title() -> String {
    JobTitle().fake()
}

fn gen_url() -> String {
    let slug: String = CompanyName().fake::<String>().to_lowercase().replace(' ', "-");
    format!("https://www.{slug}.example")
}

fn gen_ip() -> String {
    IPv4().fake()
}

fn gen_user_agent() -> String {
    const BROWSERS: &[&str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
    ];
    let index = rand::thread_rng().gen_range(0..BROWSERS.len());
    BROWSERS[index].to_string()
}

fn gen_description() -> String {
    let sentence: String = Sentence(3..8).fake();
    sentence
}

fn gen_date() -> String {
    let offset_days = rand::thread_rng().gen_range(-3650..3650);
    (Utc::now().date_naive() + ChronoDuration::days(offset_days)).to_string()
}

fn gen_timestamp() -> String {
    let offset_secs = rand::thread_rng().gen_range(-315_360_000..315_360_000);
    (Utc::now() + ChronoDuration::seconds(offset_secs))
        .naive_utc()
        .to_string()
}

fn gen_json_object() -> String {
    let mut rng = rand::thread_rng();
    let value = serde_json::json!({
        "id": Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
        "name": Name().fake::<String>(),
        "active": rng.gen_bool(0.5),
        "score": rng.gen_range(0.0..100.0),
        "tags": ["load", "synthetic"],
        "metadata": {},
    });
    value.to_string()
}

fn gen_bytea() -> String {
    let bytes: Vec<u8> = (0..16).map(|_| rand::thread_rng().gen()).collect();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("\\x{hex}")
}

fn gen_interval() -> String {
    let hours = rand::thread_rng().gen_range(1..72);
    format!("{hours} hours")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_pattern_wins_over_declared_type() {
        let value = generate("text", "work_email");
        assert!(value.contains('@'));
    }

    #[test]
    fn integer_family_produces_digits_only() {
        let value = generate("integer", "count");
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn boolean_is_true_or_false() {
        let value = generate("boolean", "flag");
        assert!(value == "true" || value == "false");
    }

    #[test]
    fn jsonb_round_trips_through_serde_json() {
        let value = generate("jsonb", "payload");
        let parsed: serde_json::Value = serde_json::from_str(&value).expect("valid json");
        assert!(parsed.get("id").is_some());
    }

    #[test]
    fn unknown_type_falls_back_to_sentence() {
        let value = generate("custom_enum_type", "status");
        assert!(!value.is_empty());
    }
}
