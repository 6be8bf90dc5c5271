//! Domain services

pub mod aggregator;
pub mod annotations;
pub mod detection_source;
pub mod dispatcher;
pub mod ingestor;
pub mod normalizer;
pub mod payload;
pub mod photo_detections;
pub mod video_detections;
