use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a customer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Completed,
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPLETED" => Ok(OrderStatus::Completed),
            "PENDING" => Ok(OrderStatus::Pending),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

/// Stock state of a single line in an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    Available,
    OutOfStock,
    BackOrder,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Available => "AVAILABLE",
            OrderItemStatus::OutOfStock => "OUT_OF_STOCK",
            OrderItemStatus::BackOrder => "BACK_ORDER",
        }
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(OrderItemStatus::Available),
            "OUT_OF_STOCK" => Ok(OrderItemStatus::OutOfStock),
            "BACK_ORDER" => Ok(OrderItemStatus::BackOrder),
            _ => Err(format!("Invalid order item status: {}", s)),
        }
    }
}

/// An order placed by a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrder {
    pub id: Option<i64>,
    pub placed_date: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    /// Human-facing order code
    pub code: Option<String>,
    pub customer_id: Option<i64>,
}

/// One product line of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Option<i64>,
    pub quantity: Option<i32>,
    pub total_price: Option<Decimal>,
    pub status: Option<OrderItemStatus>,
    pub product_id: Option<i64>,
    pub order_id: Option<i64>,
}

super::impl_identity_eq!(ProductOrder, OrderItem);
