pub mod detection;

pub use detection::{detect_anomalies, AnomalyDetection, AnomalyType, Severity};
