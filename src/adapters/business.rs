//! Business rules used to derive adapter features and labels.

use crate::error::{HeveaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Seasonal price multiplier for a calendar month (1 = January).
///
/// Spring 1.2, summer 1.5, autumn 1.0, winter 0.8.
#[must_use]
pub fn season_factor(month: u32) -> f64 {
    match month {
        3..=5 => 1.2,
        6..=8 => 1.5,
        9..=11 => 1.0,
        _ => 0.8,
    }
}

/// Demand multiplier: 1.3 on weekdays between 09:00 and 17:59, else 1.0.
///
/// `weekday` counts from Sunday = 0.
#[must_use]
pub fn demand_factor(weekday: u32, hour: u32) -> f64 {
    if (1..=5).contains(&weekday) && (9..=17).contains(&hour) {
        1.3
    } else {
        1.0
    }
}

/// Loyalty on a 0 to 10 scale from order count and total spend.
///
/// `min(10, 0.5 * orders + average_order / 1000)`; zero orders score 0.
#[must_use]
pub fn loyalty_score(order_count: usize, total_amount: f64) -> f64 {
    if order_count == 0 {
        return 0.0;
    }
    let orders = order_count as f64;
    let average = total_amount / orders;
    (orders * 0.5 + average / 1000.0).min(10.0)
}

/// Share of the year a customer is active in: distinct months / 12.
#[must_use]
pub fn seasonality<I: IntoIterator<Item = u32>>(months: I) -> f64 {
    let distinct: BTreeSet<u32> = months.into_iter().collect();
    distinct.len() as f64 / 12.0
}

/// Customer segment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CustomerSegment {
    #[serde(rename = "VIP")]
    Vip,
    Regular,
    New,
    #[serde(rename = "At-Risk")]
    AtRisk,
}

impl CustomerSegment {
    /// Display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerSegment::Vip => "VIP",
            CustomerSegment::Regular => "Regular",
            CustomerSegment::New => "New",
            CustomerSegment::AtRisk => "At-Risk",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerSegment {
    type Err = HeveaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vip" => Ok(CustomerSegment::Vip),
            "regular" => Ok(CustomerSegment::Regular),
            "new" => Ok(CustomerSegment::New),
            "at-risk" | "at_risk" | "atrisk" => Ok(CustomerSegment::AtRisk),
            _ => Err(HeveaError::validation(format!("unknown customer segment '{s}'"))),
        }
    }
}

/// Rule-based segment used to label historical customers.
///
/// VIP needs frequency >= 10, average order >= 1000 and loyalty >= 7;
/// Regular needs frequency >= 5 and average order >= 500; fewer than 3
/// purchases is New; everyone else is At-Risk.
#[must_use]
pub fn classify_customer_segment(frequency: f64, avg_order_value: f64, loyalty: f64) -> CustomerSegment {
    if frequency >= 10.0 && avg_order_value >= 1000.0 && loyalty >= 7.0 {
        CustomerSegment::Vip
    } else if frequency >= 5.0 && avg_order_value >= 500.0 {
        CustomerSegment::Regular
    } else if frequency < 3.0 {
        CustomerSegment::New
    } else {
        CustomerSegment::AtRisk
    }
}
