//! Business-domain adapters over the generic KNN engine.
//!
//! A [`DomainAdapter`] is a plain value: two extraction functions, the
//! feature names they produce and a default `k`. Training and prediction go
//! through the one [`KNearestNeighbors`] engine, so every domain shares the
//! same normalization, search and voting behavior.
//!
//! Missing record fields become `0.0` in the feature vector.
//!
//! # Example
//!
//! ```
//! use hevea::adapters::{CustomerRecord, CustomerSegment, CUSTOMER_SEGMENTATION};
//!
//! let history: Vec<CustomerRecord> = (0..8)
//!     .map(|i| {
//!         let vip = i % 2 == 0;
//!         CustomerRecord {
//!             purchase_frequency: Some(if vip { 20.0 } else { 1.0 }),
//!             avg_order_value: Some(if vip { 1500.0 } else { 200.0 }),
//!             segment: Some(if vip { CustomerSegment::Vip } else { CustomerSegment::New }),
//!             ..CustomerRecord::default()
//!         }
//!     })
//!     .collect();
//!
//! let model = CUSTOMER_SEGMENTATION.train(&history).expect("labeled history");
//! let query = CustomerRecord {
//!     purchase_frequency: Some(18.0),
//!     avg_order_value: Some(1400.0),
//!     ..CustomerRecord::default()
//! };
//! let prediction = CUSTOMER_SEGMENTATION.predict(&model, &query).expect("same arity");
//! assert_eq!(prediction.label, CustomerSegment::Vip);
//! ```

mod anomaly;
mod business;

pub use anomaly::{
    AnomalyDetector, AnomalyModel, AnomalyReport, RiskLevel, TransactionRecord,
    TRANSACTION_FEATURES,
};
pub use business::{
    classify_customer_segment, demand_factor, loyalty_score, season_factor, seasonality,
    CustomerSegment,
};

use crate::classification::{KNearestNeighbors, KnnModel, KnnPrediction};
use crate::error::{HeveaError, Result};
use crate::grading::QualityGrade;
use crate::traits::Label;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Maps records of type `R` onto the KNN engine with labels of type `L`.
#[derive(Clone, Copy)]
pub struct DomainAdapter<R, L> {
    name: &'static str,
    feature_names: &'static [&'static str],
    default_k: usize,
    extract_features: fn(&R) -> Vec<f64>,
    extract_label: fn(&R) -> Option<L>,
}

impl<R, L: Label> DomainAdapter<R, L> {
    /// Builds an adapter from its extraction functions.
    ///
    /// `extract_features` must return exactly `feature_names.len()` values.
    #[must_use]
    pub const fn new(
        name: &'static str,
        feature_names: &'static [&'static str],
        default_k: usize,
        extract_features: fn(&R) -> Vec<f64>,
        extract_label: fn(&R) -> Option<L>,
    ) -> Self {
        Self {
            name,
            feature_names,
            default_k,
            extract_features,
            extract_label,
        }
    }

    /// Domain name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Feature names, in vector order.
    #[must_use]
    pub fn feature_names(&self) -> &'static [&'static str] {
        self.feature_names
    }

    /// Neighbors consulted unless overridden.
    #[must_use]
    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Estimator with the domain's default `k`, Euclidean distance and
    /// normalization.
    #[must_use]
    pub fn estimator(&self) -> KNearestNeighbors {
        KNearestNeighbors::new(self.default_k)
    }

    /// Feature vector of one record.
    #[must_use]
    pub fn features(&self, record: &R) -> Vec<f64> {
        (self.extract_features)(record)
    }

    /// Label of one record, if it carries one.
    #[must_use]
    pub fn label(&self, record: &R) -> Option<L> {
        (self.extract_label)(record)
    }

    /// Trains with [`DomainAdapter::estimator`].
    ///
    /// # Errors
    ///
    /// Returns `EmptyTrainingSet` for no records and `Validation` when a
    /// record carries no label.
    pub fn train(&self, records: &[R]) -> Result<KnnModel<L>> {
        self.train_with(&self.estimator(), records)
    }

    /// Trains with a caller-supplied estimator.
    ///
    /// # Errors
    ///
    /// Same as [`DomainAdapter::train`], plus every error of
    /// [`KNearestNeighbors::fit`].
    pub fn train_with(&self, estimator: &KNearestNeighbors, records: &[R]) -> Result<KnnModel<L>> {
        let rows: Vec<Vec<f64>> = records.iter().map(|r| self.features(r)).collect();
        let labels = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                self.label(r).ok_or_else(|| {
                    HeveaError::validation(format!("{} record {i} has no label", self.name))
                })
            })
            .collect::<Result<Vec<L>>>()?;

        debug!(domain = self.name, records = records.len(), k = estimator.k(), "training adapter");
        estimator.fit_rows(&rows, &labels)
    }

    /// Predicts the label of `record`; its own label, if any, is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the model was trained on another domain.
    pub fn predict(&self, model: &KnnModel<L>, record: &R) -> Result<KnnPrediction<L>> {
        model.predict(&self.features(record))
    }
}

impl<R, L> fmt::Debug for DomainAdapter<R, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainAdapter")
            .field("name", &self.name)
            .field("feature_names", &self.feature_names)
            .field("default_k", &self.default_k)
            .finish_non_exhaustive()
    }
}

fn or_zero(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(0.0)).collect()
}

/// A latex lab record as kept by the quality ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityRecord {
    pub drc_percentage: Option<f64>,
    pub moisture_content: Option<f64>,
    pub impurities: Option<f64>,
    pub color_score: Option<f64>,
    pub viscosity: Option<f64>,
    pub quality_grade: Option<QualityGrade>,
}

/// Quality grading: five lab features, `k = 3`.
pub const QUALITY_GRADING: DomainAdapter<QualityRecord, QualityGrade> = DomainAdapter::new(
    "quality",
    &crate::grading::FEATURE_NAMES,
    3,
    |r: &QualityRecord| {
        or_zero(&[
            r.drc_percentage,
            r.moisture_content,
            r.impurities,
            r.color_score,
            r.viscosity,
        ])
    },
    |r: &QualityRecord| r.quality_grade,
);

/// A historical latex sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceRecord {
    pub volume: Option<f64>,
    pub quality_score: Option<f64>,
    pub season_factor: Option<f64>,
    pub demand_factor: Option<f64>,
    pub historical_price: Option<f64>,
    /// Realized price per unit
    pub price: Option<f64>,
}

/// Price prediction: `k = 5`, numeric labels voted as exact values.
pub const PRICE_PREDICTION: DomainAdapter<PriceRecord, OrderedFloat<f64>> = DomainAdapter::new(
    "price",
    &[
        "volume",
        "qualityScore",
        "seasonFactor",
        "demandFactor",
        "historicalPrice",
    ],
    5,
    |r: &PriceRecord| {
        or_zero(&[
            r.volume,
            r.quality_score,
            r.season_factor,
            r.demand_factor,
            r.historical_price,
        ])
    },
    |r: &PriceRecord| r.price.map(OrderedFloat),
);

/// Observed demand under given calendar and market conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemandRecord {
    /// 0 = Sunday
    pub day_of_week: Option<f64>,
    /// 1 to 12
    pub month: Option<f64>,
    pub season_factor: Option<f64>,
    pub weather_factor: Option<f64>,
    pub market_trend: Option<f64>,
    pub historical_demand: Option<f64>,
    pub demand: Option<f64>,
}

/// Demand forecasting: `k = 7`.
pub const DEMAND_FORECASTING: DomainAdapter<DemandRecord, OrderedFloat<f64>> = DomainAdapter::new(
    "demand",
    &[
        "dayOfWeek",
        "month",
        "seasonFactor",
        "weatherFactor",
        "marketTrend",
        "historicalDemand",
    ],
    7,
    |r: &DemandRecord| {
        or_zero(&[
            r.day_of_week,
            r.month,
            r.season_factor,
            r.weather_factor,
            r.market_trend,
            r.historical_demand,
        ])
    },
    |r: &DemandRecord| r.demand.map(OrderedFloat),
);

/// Aggregated purchasing behavior of one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerRecord {
    pub purchase_frequency: Option<f64>,
    pub avg_order_value: Option<f64>,
    pub loyalty_score: Option<f64>,
    pub location_factor: Option<f64>,
    pub seasonality: Option<f64>,
    pub segment: Option<CustomerSegment>,
}

/// Customer segmentation: `k = 5`.
pub const CUSTOMER_SEGMENTATION: DomainAdapter<CustomerRecord, CustomerSegment> =
    DomainAdapter::new(
        "customer",
        &[
            "purchaseFrequency",
            "avgOrderValue",
            "loyaltyScore",
            "locationFactor",
            "seasonality",
        ],
        5,
        |r: &CustomerRecord| {
            or_zero(&[
                r.purchase_frequency,
                r.avg_order_value,
                r.loyalty_score,
                r.location_factor,
                r.seasonality,
            ])
        },
        |r: &CustomerRecord| r.segment,
    );
