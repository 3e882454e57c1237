// Formatted 2-D grid shared by the tabular formats (CSV and Excel) and
// reused as label/value pairs by the PDF layout.
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use freightdeck_core::models::{Booking, Customer};

/// Exportable columns, in the documented output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    BookingNumber,
    Customer,
    Origin,
    Destination,
    Mode,
    Status,
    ContainerSize,
    CargoType,
    Quantity,
    WeightKg,
    VolumeCbm,
    ReadyDate,
    DeliveryDate,
    QuoteAmount,
    CreatedAt,
}

impl Column {
    /// The full documented column order.
    pub const ALL: [Column; 15] = [
        Column::BookingNumber,
        Column::Customer,
        Column::Origin,
        Column::Destination,
        Column::Mode,
        Column::Status,
        Column::ContainerSize,
        Column::CargoType,
        Column::Quantity,
        Column::WeightKg,
        Column::VolumeCbm,
        Column::ReadyDate,
        Column::DeliveryDate,
        Column::QuoteAmount,
        Column::CreatedAt,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::BookingNumber => "Booking Number",
            Column::Customer => "Customer",
            Column::Origin => "Origin",
            Column::Destination => "Destination",
            Column::Mode => "Mode",
            Column::Status => "Status",
            Column::ContainerSize => "Container Size",
            Column::CargoType => "Cargo Type",
            Column::Quantity => "Quantity",
            Column::WeightKg => "Weight (kg)",
            Column::VolumeCbm => "Volume (cbm)",
            Column::ReadyDate => "Ready Date",
            Column::DeliveryDate => "Delivery Date",
            Column::QuoteAmount => "Quote Amount",
            Column::CreatedAt => "Created At",
        }
    }
}

/// Header row plus one pre-formatted row per record. Everything is already
/// a display string by the time it lands here.
#[derive(Debug, Clone)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Build the export grid. One output row per input booking, always.
pub fn build_grid(bookings: &[Booking], customers: &[Customer], columns: &[Column]) -> Grid {
    let names: HashMap<i64, &str> = customers
        .iter()
        .map(|c| (c.id, c.company_name.as_str()))
        .collect();

    let headers = columns.iter().map(|c| c.header().to_string()).collect();
    let rows = bookings
        .iter()
        .map(|b| columns.iter().map(|c| cell(b, c, &names)).collect())
        .collect();

    Grid { headers, rows }
}

fn cell(booking: &Booking, column: &Column, names: &HashMap<i64, &str>) -> String {
    match column {
        Column::BookingNumber => booking.booking_number.clone(),
        Column::Customer => booking
            .customer_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("Unknown")
            .to_string(),
        Column::Origin => booking.origin.clone(),
        Column::Destination => booking.destination.clone(),
        Column::Mode => booking.mode.map(|m| m.to_string()).unwrap_or_default(),
        Column::Status => booking.status.map(|s| s.to_string()).unwrap_or_default(),
        Column::ContainerSize => booking.container_size.clone().unwrap_or_default(),
        Column::CargoType => booking.cargo_type.clone(),
        Column::Quantity => booking.quantity.map(|q| q.to_string()).unwrap_or_default(),
        Column::WeightKg => booking
            .weight_kg
            .map(|w| format!("{:.1}", w))
            .unwrap_or_default(),
        Column::VolumeCbm => booking
            .volume_cbm
            .map(|v| format!("{:.1}", v))
            .unwrap_or_default(),
        Column::ReadyDate => format_date(booking.ready_date),
        Column::DeliveryDate => format_date(booking.delivery_date),
        Column::QuoteAmount => booking
            .quote_amount
            .map(format_currency)
            .unwrap_or_default(),
        Column::CreatedAt => format_datetime(booking.created_at),
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_default()
}

pub fn format_datetime(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%d %b %Y %H:%M").to_string())
        .unwrap_or_default()
}

/// Display currency with thousands separators, e.g. "$12,345.60".
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightdeck_core::models::{BookingStatus, TransportMode};

    fn customer(id: i64, name: &str) -> Customer {
        Customer {
            id,
            company_name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
            status: None,
        }
    }

    fn booking(id: i64, customer_id: Option<i64>) -> Booking {
        Booking {
            id,
            booking_number: format!("BK-{:04}", id),
            customer_id,
            origin: "Colombo".into(),
            destination: "Rotterdam".into(),
            mode: Some(TransportMode::Sea),
            status: Some(BookingStatus::Confirmed),
            container_size: Some("40HC".into()),
            cargo_type: "Garments".into(),
            quantity: Some(420),
            weight_kg: Some(8600.0),
            volume_cbm: Some(62.0),
            ready_date: NaiveDate::from_ymd_opt(2026, 9, 4),
            delivery_date: None,
            quote_amount: Some(3150.0),
            special_instructions: None,
            created_at: None,
        }
    }

    #[test]
    fn test_one_row_per_record() {
        let bookings = vec![booking(1, Some(1)), booking(2, Some(1)), booking(3, None)];
        let customers = vec![customer(1, "Meridian Textiles Ltd")];
        let grid = build_grid(&bookings, &customers, &Column::ALL);

        assert_eq!(grid.rows.len(), bookings.len());
        assert_eq!(grid.headers.len(), Column::ALL.len());
        for row in &grid.rows {
            assert_eq!(row.len(), grid.headers.len());
        }
    }

    #[test]
    fn test_documented_column_order() {
        let grid = build_grid(&[], &[], &Column::ALL);
        assert_eq!(grid.headers[0], "Booking Number");
        assert_eq!(grid.headers[1], "Customer");
        assert_eq!(grid.headers[13], "Quote Amount");
        assert_eq!(grid.headers[14], "Created At");
    }

    #[test]
    fn test_unknown_customer_degrades_per_row() {
        let bookings = vec![booking(1, Some(1)), booking(2, Some(99)), booking(3, None)];
        let customers = vec![customer(1, "Meridian Textiles Ltd")];
        let grid = build_grid(&bookings, &customers, &Column::ALL);

        assert_eq!(grid.rows[0][1], "Meridian Textiles Ltd");
        assert_eq!(grid.rows[1][1], "Unknown");
        assert_eq!(grid.rows[2][1], "Unknown");
    }

    #[test]
    fn test_column_subset_is_honored() {
        let columns = [Column::BookingNumber, Column::QuoteAmount];
        let grid = build_grid(&[booking(1, None)], &[], &columns);
        assert_eq!(grid.headers, vec!["Booking Number", "Quote Amount"]);
        assert_eq!(grid.rows[0], vec!["BK-0001", "$3,150.00"]);
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(7.5), "$7.50");
        assert_eq!(format_currency(3150.0), "$3,150.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-980.4), "-$980.40");
    }

    #[test]
    fn test_date_formatting_and_blanks() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 9, 4)), "04 Sep 2026");
        assert_eq!(format_date(None), "");
        assert_eq!(format_datetime(None), "");
    }
}
