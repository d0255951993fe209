//! Core library for the shift-counts engine.
//!
//! The engine records per-quarter headcount and throughput counts for the
//! roles of a work shift and reconciles them into a multi-sheet workbook plus
//! a durable JSON store. Record types and the role catalog live in
//! [`shift::counts::model`], workbook and store adapters under
//! [`shift::counts::io`], the per-sheet views in [`shift::counts::workbook`],
//! [`shift::counts::eos`] and [`shift::counts::changelog`], quarter
//! comparison in [`shift::counts::delta`], and the submission orchestration in
//! [`shift::counts::sync`].

pub mod shift;

pub use shift::counts::{
    CountsError, Result, batch, changelog, config, delta, eos, error, import, io, model, sync,
    table, trend, workbook,
};
