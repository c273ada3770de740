//! # Seedscan - miRNA Target Prediction
//!
//! A Rust implementation of the miRmap microRNA target prediction and
//! scoring method. The library finds candidate miRNA binding sites on
//! transcript sequences through seed matching and quantifies their
//! repression strength with empirical, thermodynamic, probabilistic and
//! evolutionary features combined by a regression model.
//!
//! ## Overview
//!
//! Prediction runs in two stages. Seed matching scans the reverse
//! complement of the transcript for the miRNA seed at the configured seed
//! lengths and produces [`types::Target`] values anchored in transcript
//! coordinates. Scoring then computes, per target, the feature set the
//! available resources allow: site context features always, folding
//! energies when a [`engines::FoldingEngine`] is supplied, occurrence
//! probabilities from a Markov chain fitted on the transcript, and
//! conservation scores when a multi-species alignment is provided.
//!
//! ## Features
//!
//! - **Seed matching**: overlapping, multi-length search with longest-match
//!   priority
//! - **Site context**: AU content, site position and 3' pairing with an
//!   optional empirical correction
//! - **Thermodynamics**: duplex, binding and site-opening energies through
//!   a pluggable folding backend
//! - **Probabilistics**: binomial and exact over-representation p-values
//! - **Evolution**: Branch Length Score and PhyloP selection test over a
//!   species alignment
//!
//! ## Quick Start
//!
//! ```rust
//! use seedscan_core::config::ScanConfig;
//! use seedscan_core::pipeline::{ScoreResources, Scorer};
//! use seedscan_core::types::Feature;
//!
//! let scorer = Scorer::new(ScanConfig::default());
//!
//! // Transcript with a planted site for the miR-122 seed.
//! let transcript = format!("{}ACACTCCA{}", "G".repeat(20), "G".repeat(32));
//! let scored = scorer.score_transcript(
//!     &transcript,
//!     "UGGAGUGUGACAAUGGUGUUUG",
//!     &ScoreResources::default(),
//! )?;
//!
//! assert_eq!(scored.len(), 1);
//! let (target, features) = &scored[0];
//! assert_eq!(target.seed_length(), 7);
//! assert!(features.contains_key(&Feature::MirmapScore));
//! # Ok::<(), seedscan_core::types::ScanError>(())
//! ```

pub mod config;
pub mod conservation;
pub mod engines;
pub mod markov;
pub mod model;
pub mod newick;
pub mod phast;
pub mod pipeline;
pub mod prob;
pub mod report;
pub mod seed;
pub mod sequence;
pub mod targetscan;
pub mod thermo;
pub mod types;

pub use pipeline::{aggregate, ScoreResources, Scorer};
pub use types::{Feature, FeatureMap, ScanError, Target};
