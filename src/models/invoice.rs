use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Paid,
    Issued,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Issued => "ISSUED",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(InvoiceStatus::Paid),
            "ISSUED" => Ok(InvoiceStatus::Issued),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// How an invoice was (or will be) settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    CashOnDelivery,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::CashOnDelivery => "CASH_ON_DELIVERY",
            PaymentMethod::Paypal => "PAYPAL",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "CASH_ON_DELIVERY" => Ok(PaymentMethod::CashOnDelivery),
            "PAYPAL" => Ok(PaymentMethod::Paypal),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub details: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_amount: Option<Decimal>,
    pub order_id: Option<i64>,
}

/// A parcel sent against an invoice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Option<i64>,
    pub tracking_code: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub details: Option<String>,
    pub invoice_id: Option<i64>,
}

super::impl_identity_eq!(Invoice, Shipment);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("PAID", InvoiceStatus::Paid)]
    #[case("ISSUED", InvoiceStatus::Issued)]
    #[case("CANCELLED", InvoiceStatus::Cancelled)]
    fn test_invoice_status_parse(#[case] input: &str, #[case] expected: InvoiceStatus) {
        assert_eq!(input.parse::<InvoiceStatus>().unwrap(), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[rstest]
    #[case("CREDIT_CARD", PaymentMethod::CreditCard)]
    #[case("CASH_ON_DELIVERY", PaymentMethod::CashOnDelivery)]
    #[case("PAYPAL", PaymentMethod::Paypal)]
    fn test_payment_method_parse(#[case] input: &str, #[case] expected: PaymentMethod) {
        assert_eq!(input.parse::<PaymentMethod>().unwrap(), expected);
    }

    #[test]
    fn test_payment_method_unknown() {
        assert!("BITCOIN".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_invoice_json_uses_wire_names() {
        let invoice = Invoice {
            id: Some(7),
            status: Some(InvoiceStatus::Issued),
            payment_method: Some(PaymentMethod::CashOnDelivery),
            ..Default::default()
        };
        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["status"], "ISSUED");
        assert_eq!(json["paymentMethod"], "CASH_ON_DELIVERY");
    }

    #[test]
    fn test_shipment_identity_by_id() {
        let shipment1 = Shipment {
            id: Some(1),
            ..Default::default()
        };
        let mut shipment2 = Shipment {
            id: shipment1.id,
            tracking_code: Some("1Z999".to_string()),
            ..Default::default()
        };
        assert_eq!(shipment1, shipment2);

        shipment2.id = Some(2);
        assert_ne!(shipment1, shipment2);

        let unsaved = Shipment::default();
        assert_ne!(unsaved, shipment2);
    }
}
