//! W3C trace-context propagation.
//!
//! # Responsibilities
//! - Parse an inbound `traceparent` header into a trace context
//! - Originate a new trace (with a sampling decision) when none exists
//! - Inject the gateway's own hop into outbound headers
//!
//! # Design Decisions
//! - The forwarded hop always carries the gateway's span id as parent;
//!   inbound trace headers are never passed through verbatim
//! - Sampling is decided once at trace origination and inherited unchanged
//!   by every downstream hop
//! - `tracestate` is dropped on injection: the gateway participates in no
//!   vendor-specific trace state

use axum::http::{HeaderMap, HeaderValue};

pub const TRACEPARENT: &str = "traceparent";
pub const TRACESTATE: &str = "tracestate";

const SAMPLED_FLAG: u8 = 0x01;

/// Probabilistic head sampler for gateway-originated traces.
#[derive(Debug, Clone, Copy)]
pub struct RatioSampler {
    ratio: f64,
}

impl RatioSampler {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Decide whether a newly originated trace is sampled.
    pub fn decide(&self) -> bool {
        fastrand::f64() < self.ratio
    }
}

/// Trace identifiers for the hop the gateway is about to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    /// End-to-end trace identifier, non-zero.
    pub trace_id: u128,
    /// The gateway's own span id for this hop, non-zero.
    pub span_id: u64,
    /// Span id of the calling hop, when the trace came from upstream.
    pub parent_span_id: Option<u64>,
    /// Sampling decision, made at trace origin and never re-decided.
    pub sampled: bool,
}

impl TraceContext {
    /// Build the context for this hop: continue a valid inbound trace as a
    /// child span, or originate a fresh trace.
    pub fn extract_or_originate(headers: &HeaderMap, sampler: &RatioSampler) -> Self {
        headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .map(|parent| parent.child())
            .unwrap_or_else(|| Self::originate(sampler))
    }

    /// Originate a new trace with a fresh sampling decision.
    pub fn originate(sampler: &RatioSampler) -> Self {
        Self {
            trace_id: fastrand::u128(1..),
            span_id: fastrand::u64(1..),
            parent_span_id: None,
            sampled: sampler.decide(),
        }
    }

    /// Parse a `traceparent` value: `00-{trace_id:032x}-{span_id:016x}-{flags:02x}`.
    ///
    /// All-zero trace or span ids are invalid per W3C trace-context, as
    /// is any version other than 00.
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');

        let version = parts.next()?;
        let trace_field = parts.next()?;
        let span_field = parts.next()?;
        let flags_field = parts.next()?;
        if parts.next().is_some() || version != "00" {
            return None;
        }
        if trace_field.len() != 32 || span_field.len() != 16 || flags_field.len() != 2 {
            return None;
        }

        let trace_id = u128::from_str_radix(trace_field, 16).ok()?;
        let span_id = u64::from_str_radix(span_field, 16).ok()?;
        let flags = u8::from_str_radix(flags_field, 16).ok()?;
        if trace_id == 0 || span_id == 0 {
            return None;
        }

        Some(Self {
            trace_id,
            span_id,
            parent_span_id: None,
            sampled: flags & SAMPLED_FLAG != 0,
        })
    }

    /// Derive the child context for the hop the gateway creates: same
    /// trace, fresh span id, inherited sampling decision.
    fn child(self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: fastrand::u64(1..),
            parent_span_id: Some(self.span_id),
            sampled: self.sampled,
        }
    }

    /// Write this hop's `traceparent` into the outbound headers,
    /// overwriting anything copied from the inbound request.
    pub fn inject(&self, headers: &mut HeaderMap) {
        headers.insert(
            TRACEPARENT,
            HeaderValue::from_str(&self.to_header_value()).unwrap(),
        );
        headers.remove(TRACESTATE);
    }

    /// Serialized `traceparent` value for this hop.
    pub fn to_header_value(&self) -> String {
        let flags = if self.sampled { SAMPLED_FLAG } else { 0 };
        format!("00-{:032x}-{:016x}-{:02x}", self.trace_id, self.span_id, flags)
    }
}
