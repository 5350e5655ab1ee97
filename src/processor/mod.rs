//! # Contact Processor
//!
//! Executes every required channel send for one contact and computes the
//! contact's overall status. Channel failures are local to the contact:
//! a missing field or a gateway error becomes a failed [`MethodResult`],
//! never a propagated error.

pub mod contact_processor;

pub use contact_processor::ContactProcessor;
