// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Big-endian bit field codec.

Bit 0 of a buffer is the most significant bit of byte 0. A field of `width`
bits starting at `start_bit` holds its most significant bit first. Fields do
not need to be byte aligned and may straddle up to nine bytes (a 64 bit field
starting mid-byte), so the span is accumulated in a `u128`.
*/

use crate::{GenePoolError, GenePoolResult};

/// Widest field the codec can read or write.
pub const MAX_FIELD_WIDTH: usize = 64;

/// Largest value representable in `width` bits (`u64::MAX` at 64).
pub const fn max_for_bit_width(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Number of whole bytes needed to hold `bits` bits.
pub const fn bits_to_bytes(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Reads the bits in `[start_bit, end_bit)` as an unsigned integer.
///
/// # Errors
/// - [`GenePoolError::FieldTooWide`] if the range is wider than 64 bits
/// - [`GenePoolError::OutOfBounds`] if the range is inverted or leaves the buffer
pub fn read_bits(buffer: &[u8], start_bit: usize, end_bit: usize) -> GenePoolResult<u64> {
    if end_bit < start_bit {
        return Err(out_of_bounds(buffer, start_bit, end_bit));
    }
    let width = end_bit - start_bit;
    if width > MAX_FIELD_WIDTH {
        return Err(GenePoolError::FieldTooWide { width });
    }
    if width == 0 {
        return Ok(0);
    }

    let (first, last) = byte_span(buffer, start_bit, end_bit)?;
    let accumulated = accumulate(&buffer[first..=last]);
    let trailing = (last + 1) * 8 - end_bit;
    let value = (accumulated >> trailing) & u128::from(max_for_bit_width(width));
    Ok(value as u64)
}

/// Writes `value` into the `width` bits starting at `start_bit`.
///
/// Only bits inside the range change; neighbouring fields sharing the same
/// bytes are preserved.
///
/// # Errors
/// - [`GenePoolError::FieldTooWide`] if `width` exceeds 64
/// - [`GenePoolError::ValueTooWide`] if `value` needs more than `width` bits
/// - [`GenePoolError::OutOfBounds`] if the range leaves the buffer
pub fn write_bits(
    buffer: &mut [u8],
    start_bit: usize,
    width: usize,
    value: u64,
) -> GenePoolResult<()> {
    if width > MAX_FIELD_WIDTH {
        return Err(GenePoolError::FieldTooWide { width });
    }
    let max = max_for_bit_width(width);
    if value > max {
        return Err(GenePoolError::ValueTooWide { value, width });
    }
    if width == 0 {
        return Ok(());
    }
    let end_bit = start_bit
        .checked_add(width)
        .ok_or_else(|| out_of_bounds(buffer, start_bit, usize::MAX))?;

    let (first, last) = byte_span(buffer, start_bit, end_bit)?;
    let span = &mut buffer[first..=last];
    let trailing = (last + 1) * 8 - end_bit;
    let mask = u128::from(max) << trailing;

    let mut accumulated = (accumulate(span) & !mask) | (u128::from(value) << trailing);
    for byte in span.iter_mut().rev() {
        *byte = accumulated as u8;
        accumulated >>= 8;
    }
    Ok(())
}

fn accumulate(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte))
}

/// Inclusive byte indices covering a non-empty bit range.
fn byte_span(buffer: &[u8], start_bit: usize, end_bit: usize) -> GenePoolResult<(usize, usize)> {
    let first = start_bit / 8;
    let last = (end_bit - 1) / 8;
    if last >= buffer.len() {
        return Err(out_of_bounds(buffer, start_bit, end_bit));
    }
    Ok((first, last))
}

fn out_of_bounds(buffer: &[u8], start: usize, end: usize) -> GenePoolError {
    GenePoolError::OutOfBounds {
        start,
        end,
        len: buffer.len().saturating_mul(8),
    }
}
