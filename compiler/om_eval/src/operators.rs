//! Integer binary operators.
//!
//! Pure functions over integer literals. Values are arbitrary precision, so
//! results are exact; the result width is derived from the operand widths and
//! widened if needed so it always holds the exact result. Operands of
//! different widths are fine.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use om_ir::{IntegerAttr, IntegerBinaryOp};

use crate::errors::{
    integer_width_exceeded, negative_shift_amount, shift_amount_too_large, EvalResult,
};

/// Widest integer result the evaluator will produce, in bits.
pub const MAX_INTEGER_WIDTH: u32 = 1 << 16;

/// Evaluate an integer binary operation.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "BigInt operations are exact; widths are u32 values summed in u64"
)]
pub fn evaluate_integer_binary(
    op: IntegerBinaryOp,
    lhs: &IntegerAttr,
    rhs: &IntegerAttr,
) -> EvalResult<IntegerAttr> {
    match op {
        IntegerBinaryOp::Add => {
            let width = u64::from(lhs.width.max(rhs.width)) + 1;
            finish(op, &lhs.value + &rhs.value, width)
        }
        IntegerBinaryOp::Mul => {
            let width = u64::from(lhs.width) + u64::from(rhs.width);
            finish(op, &lhs.value * &rhs.value, width)
        }
        IntegerBinaryOp::Shl => {
            let amount = shift_amount(op, rhs)?;
            let width = u64::from(lhs.width).saturating_add(amount);
            // Reject before shifting so huge amounts never allocate.
            check_width(op, width)?;
            finish(op, &lhs.value << amount, width)
        }
        IntegerBinaryOp::Shr => {
            let amount = shift_amount(op, rhs)?;
            // Arithmetic shift: rounds toward negative infinity.
            finish(op, &lhs.value >> amount, u64::from(lhs.width))
        }
    }
}

/// Validate a shift amount: non-negative and representable in 64 bits.
fn shift_amount(op: IntegerBinaryOp, rhs: &IntegerAttr) -> EvalResult<u64> {
    if rhs.value.is_negative() {
        return Err(negative_shift_amount(op.mnemonic()));
    }
    rhs.value
        .to_u64()
        .ok_or_else(|| shift_amount_too_large(op.mnemonic()))
}

fn check_width(op: IntegerBinaryOp, width: u64) -> EvalResult<()> {
    if width > u64::from(MAX_INTEGER_WIDTH) {
        return Err(integer_width_exceeded(op.mnemonic(), width, MAX_INTEGER_WIDTH));
    }
    Ok(())
}

/// Build the signed result, widening to the exact result's minimum width.
fn finish(op: IntegerBinaryOp, value: BigInt, width: u64) -> EvalResult<IntegerAttr> {
    let width = width.max(IntegerAttr::min_signed_width(&value));
    check_width(op, width)?;
    let width = u32::try_from(width)
        .map_err(|_| integer_width_exceeded(op.mnemonic(), width, MAX_INTEGER_WIDTH))?;
    Ok(IntegerAttr::signed(value, width))
}
