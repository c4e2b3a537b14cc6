//! CSV export of the per-customer listing.

use chrono::{DateTime, Utc};

use crate::aggregation::CustomerGroup;
use crate::models::ContactKind;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// `Cliente,<contact label>,Asientos,Fecha` followed by one row per group.
pub fn to_csv(groups: &[CustomerGroup], contact_kind: ContactKind) -> String {
    let mut out = format!("Cliente,{},Asientos,Fecha\n", contact_kind.label());

    for group in groups {
        let seats = group
            .seat_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let row = [
            escape(&group.customer_name),
            escape(group.customer_contact.as_deref().unwrap_or_default()),
            escape(&seats),
            group.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

pub fn file_name(at: DateTime<Utc>) -> String {
    format!("cinema-reservations-{}.csv", at.format("%Y-%m-%d"))
}

// RFC 4180: quote fields holding separators, quotes or line breaks
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn group(name: &str, contact: Option<&str>, seats: &[&str]) -> CustomerGroup {
        CustomerGroup {
            customer_name: name.into(),
            customer_contact: contact.map(Into::into),
            seat_ids: seats.iter().map(|s| s.parse().unwrap()).collect(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap(),
        }
    }

    #[test]
    fn one_row_per_group_with_quoted_seat_list() {
        let csv = to_csv(
            &[group("Ana", Some("555"), &["A01", "A02"]), group("Luis", None, &["C10"])],
            ContactKind::Phone,
        );
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Cliente,Teléfono,Asientos,Fecha");
        assert_eq!(lines[1], "Ana,555,\"A01, A02\",2024-03-09 18:30");
        assert_eq!(lines[2], "Luis,,C10,2024-03-09 18:30");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn email_variant_changes_header() {
        let csv = to_csv(&[], ContactKind::Email);
        assert_eq!(csv, "Cliente,Correo,Asientos,Fecha\n");
    }

    #[test]
    fn quotes_are_doubled() {
        let csv = to_csv(&[group("Ana \"La\" Pérez", None, &["E18"])], ContactKind::Phone);
        assert!(csv.contains("\"Ana \"\"La\"\" Pérez\",,E18,"));
    }

    #[test]
    fn file_name_carries_the_date() {
        let at = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(file_name(at), "cinema-reservations-2024-12-01.csv");
    }
}
