use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::booking::{BookingStatus, NewBooking};
use crate::error::DomainError;

/// Lifecycle of a quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Converted,
    Paid,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Approved => "approved",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Converted => "converted",
            QuotationStatus::Paid => "paid",
        }
    }

    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Sent, Approved)
                | (Sent, Rejected)
                | (Approved, Converted)
                | (Approved, Paid)
                | (Converted, Paid)
        )
    }

    pub fn transition(self, next: QuotationStatus) -> Result<QuotationStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                kind: "quotation",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuotationStatus::Draft),
            "sent" => Ok(QuotationStatus::Sent),
            "approved" => Ok(QuotationStatus::Approved),
            "rejected" => Ok(QuotationStatus::Rejected),
            "converted" => Ok(QuotationStatus::Converted),
            "paid" => Ok(QuotationStatus::Paid),
            other => Err(DomainError::UnknownStatus {
                kind: "quotation",
                value: other.to_string(),
            }),
        }
    }
}

/// A priced line of a quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    pub id: Uuid,
    pub quotation_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
}

impl QuotationItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A priced, not-yet-confirmed proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: Uuid,
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_type: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub duration_hours: Option<f64>,
    pub service_days: Option<i32>,
    pub hours_per_day: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub tax_percentage: Option<f64>,
    pub status: QuotationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl Quotation {
    /// Item subtotal, less the discount, plus tax on the discounted amount
    pub fn totals(&self, items: &[QuotationItem]) -> QuotationTotals {
        let subtotal: f64 = items.iter().map(QuotationItem::line_total).sum();
        let discount_amount = subtotal * self.discount_percentage.unwrap_or(0.0) / 100.0;
        let taxable = subtotal - discount_amount;
        let tax_amount = taxable * self.tax_percentage.unwrap_or(0.0) / 100.0;

        QuotationTotals {
            subtotal,
            discount_amount,
            tax_amount,
            total: taxable + tax_amount,
        }
    }

    /// Build the booking an approved quotation converts into
    pub fn to_new_booking(&self, items: &[QuotationItem]) -> Result<NewBooking, DomainError> {
        self.status.transition(QuotationStatus::Converted)?;
        let date = self
            .pickup_date
            .ok_or(DomainError::MissingField("pickup_date"))?;

        let service_name = self
            .title
            .clone()
            .or_else(|| items.first().map(|i| i.description.clone()));

        Ok(NewBooking {
            reference: None,
            quotation_id: Some(self.id),
            date,
            time: self.pickup_time,
            service_name,
            service_type: self.service_type.clone(),
            pickup_location: self.pickup_location.clone(),
            dropoff_location: self.dropoff_location.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            duration_hours: self.duration_hours,
            service_days: self.service_days,
            hours_per_day: self.hours_per_day,
            price_amount: Some(self.totals(items).total),
            status: BookingStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotation(status: QuotationStatus) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: Uuid::new_v4(),
            title: Some("Hakone day trip".into()),
            customer_name: Some("Emma Wilson".into()),
            customer_email: Some("emma@example.com".into()),
            customer_phone: None,
            service_type: Some("charter".into()),
            pickup_location: Some("Park Hyatt".into()),
            dropoff_location: Some("Hakone-Yumoto".into()),
            pickup_date: Some("2024-10-05".parse().unwrap()),
            pickup_time: NaiveTime::from_hms_opt(8, 0, 0),
            duration_hours: Some(10.0),
            service_days: Some(1),
            hours_per_day: None,
            discount_percentage: Some(10.0),
            tax_percentage: Some(10.0),
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(quotation_id: Uuid, qty: i32, price: f64) -> QuotationItem {
        QuotationItem {
            id: Uuid::new_v4(),
            quotation_id,
            description: "Alphard charter".into(),
            quantity: qty,
            unit_price: price,
        }
    }

    #[test]
    fn test_allowed_transitions() {
        use QuotationStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Approved));
        assert!(Sent.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Converted));
        assert!(Converted.can_transition_to(Paid));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Converted));
        assert!(!Paid.can_transition_to(Draft));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = QuotationStatus::Draft
            .transition(QuotationStatus::Paid)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot move quotation from draft to paid");
    }

    #[test]
    fn test_totals_apply_discount_then_tax() {
        let q = quotation(QuotationStatus::Sent);
        let items = vec![item(q.id, 2, 50_000.0), item(q.id, 1, 20_000.0)];
        let totals = q.totals(&items);

        assert_eq!(totals.subtotal, 120_000.0);
        assert_eq!(totals.discount_amount, 12_000.0);
        assert_eq!(totals.tax_amount, 10_800.0);
        assert_eq!(totals.total, 118_800.0);
    }

    #[test]
    fn test_convert_approved_quotation() {
        let q = quotation(QuotationStatus::Approved);
        let items = vec![item(q.id, 1, 100_000.0)];
        let booking = q.to_new_booking(&items).unwrap();

        assert_eq!(booking.quotation_id, Some(q.id));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.service_name.as_deref(), Some("Hakone day trip"));
        assert_eq!(booking.price_amount, Some(99_000.0));
        assert_eq!(booking.date, q.pickup_date.unwrap());
    }

    #[test]
    fn test_convert_requires_approval_and_date() {
        let sent = quotation(QuotationStatus::Sent);
        assert!(matches!(
            sent.to_new_booking(&[]),
            Err(DomainError::InvalidTransition { .. })
        ));

        let mut undated = quotation(QuotationStatus::Approved);
        undated.pickup_date = None;
        assert_eq!(
            undated.to_new_booking(&[]),
            Err(DomainError::MissingField("pickup_date"))
        );
    }
}
