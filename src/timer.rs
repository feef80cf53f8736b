//! Timing of a single operation call.

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::domain::{AlgebraicDomain, Operation};
use crate::errors::Error;

/// Brackets exactly one [`AlgebraicDomain::apply`] call with clock reads.
///
/// Operand sampling, error inspection and bookkeeping all happen outside the
/// window. The result is routed through [`black_box`] so the call cannot be
/// elided, then returned for the caller to drop.
#[derive(Clone, Copy, Debug, Default)]
pub struct OperationTimer;

impl OperationTimer {
    pub fn measure<D: AlgebraicDomain + ?Sized>(
        &self,
        domain: &D,
        operation: Operation,
        operands: &D::Operands,
    ) -> Result<(D::Output, Duration), Error> {
        let operands = black_box(operands);
        let start = Instant::now();
        let output = domain.apply(operation, operands);
        let elapsed = start.elapsed();
        Ok((black_box(output)?, elapsed))
    }
}
