//! Sample conversion rules
//!
//! One set of rules covers every pairing of caller width and native encoding:
//!
//! - integer to wider integer keeps the original bits in the most significant
//!   positions (`-4860i16` reads as `-318504960i32`); to narrower integer
//!   keeps the most significant bits
//! - native integer to float divides by `2^(bits-1)` when normalizing,
//!   otherwise yields the native integer value
//! - float to native integer multiplies by `2^(bits-1) - 1` when normalizing,
//!   rounds, then clamps (clipping on) or wraps to the native width
//!   (clipping off; the wrapped value is implementation-defined)
//! - float to float is a plain copy

use crate::transfer::{ConversionSettings, Sample, SampleKind};

/// Divisor mapping native integers onto [-1.0, 1.0) when reading
#[inline]
pub fn read_scale(bits: u32) -> f64 {
    (1u64 << (bits - 1)) as f64
}

/// Multiplier mapping [-1.0, 1.0] onto native integers when writing
#[inline]
pub fn write_scale(bits: u32) -> f64 {
    read_scale(bits) - 1.0
}

/// Smallest value of a signed `bits`-wide integer
#[inline]
pub fn native_min(bits: u32) -> i64 {
    -(1i64 << (bits - 1))
}

/// Largest value of a signed `bits`-wide integer
#[inline]
pub fn native_max(bits: u32) -> i64 {
    (1i64 << (bits - 1)) - 1
}

/// Move an integer between widths, most significant bits first
#[inline]
pub fn rescale_int(value: i32, from_bits: u32, to_bits: u32) -> i32 {
    if to_bits >= from_bits {
        value.wrapping_shl(to_bits - from_bits)
    } else {
        value >> (from_bits - to_bits)
    }
}

/// Keep the low `bits` of `value`, sign-extended
#[inline]
pub fn wrap_to_bits(value: i64, bits: u32) -> i32 {
    let shift = 64 - bits;
    ((value << shift) >> shift) as i32
}

#[inline]
pub fn int_to_float(value: i32, bits: u32, normalize: bool) -> f64 {
    if normalize {
        value as f64 / read_scale(bits)
    } else {
        value as f64
    }
}

#[inline]
pub fn float_to_int(value: f64, bits: u32, normalize: bool, clip: bool) -> i32 {
    let scaled = if normalize {
        value * write_scale(bits)
    } else {
        value
    };
    let rounded = scaled.round();
    if clip {
        rounded.clamp(native_min(bits) as f64, native_max(bits) as f64) as i32
    } else {
        wrap_to_bits(rounded as i64, bits)
    }
}

// ============================================================================
// Sample implementations
// ============================================================================

macro_rules! int_sample {
    ($t:ty, $kind:expr, $bits:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = $kind;

            #[inline]
            fn from_native_int(value: i32, bits: u32, _settings: &ConversionSettings) -> Self {
                rescale_int(value, bits, $bits) as $t
            }

            #[inline]
            fn from_native_float(value: f64, settings: &ConversionSettings) -> Self {
                // Saturates: float data beyond full scale pins at the integer limits
                float_to_int(value, $bits, settings.float_int_scale_read, true) as $t
            }

            #[inline]
            fn to_native_int(self, bits: u32, _settings: &ConversionSettings) -> i32 {
                rescale_int(self as i32, $bits, bits)
            }

            #[inline]
            fn to_native_float(self, settings: &ConversionSettings) -> f64 {
                int_to_float(self as i32, $bits, settings.int_float_scale_write)
            }
        }
    };
}

macro_rules! float_sample {
    ($t:ty, $kind:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = $kind;

            #[inline]
            fn from_native_int(value: i32, bits: u32, settings: &ConversionSettings) -> Self {
                int_to_float(value, bits, settings.normalization(Self::KIND)) as $t
            }

            #[inline]
            fn from_native_float(value: f64, _settings: &ConversionSettings) -> Self {
                value as $t
            }

            #[inline]
            fn to_native_int(self, bits: u32, settings: &ConversionSettings) -> i32 {
                float_to_int(
                    self as f64,
                    bits,
                    settings.normalization(Self::KIND),
                    settings.clipping,
                )
            }

            #[inline]
            fn to_native_float(self, _settings: &ConversionSettings) -> f64 {
                self as f64
            }
        }
    };
}

int_sample!(i16, SampleKind::I16, 16);
int_sample!(i32, SampleKind::I32, 32);
float_sample!(f32, SampleKind::F32);
float_sample!(f64, SampleKind::F64);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw() -> ConversionSettings {
        ConversionSettings::default()
    }

    fn normalized() -> ConversionSettings {
        ConversionSettings {
            normalize_float: true,
            normalize_double: true,
            ..ConversionSettings::default()
        }
    }

    #[test]
    fn test_widening_places_bits_high() {
        assert_eq!(i32::from_native_int(-4860, 16, &raw()), -318504960);
        assert_eq!(i32::from_native_int(-1756, 16, &raw()), -115081216);
        assert_eq!(i16::from_native_int(-100, 8, &raw()), -25600);
        assert_eq!(i32::from_native_int(0x12_3456, 24, &raw()), 0x1234_5600);
    }

    #[test]
    fn test_narrowing_keeps_high_bits() {
        assert_eq!(i16::from_native_int(0x1234_5678, 32, &raw()), 0x1234);
        assert_eq!(i16::from_native_int(-0x40_0000, 24, &raw()), -0x4000);
        assert_eq!((-318504960i32).to_native_int(16, &raw()), -4860);
        assert_eq!(0x1234_5600i32.to_native_int(24, &raw()), 0x12_3456);
    }

    #[test]
    fn test_int_to_float_normalization() {
        assert_relative_eq!(f32::from_native_int(-16384, 16, &normalized()), -0.5);
        assert_relative_eq!(f64::from_native_int(-8388608, 24, &normalized()), -1.0);
        assert_relative_eq!(f32::from_native_int(-16384, 16, &raw()), -16384.0);
    }

    #[test]
    fn test_float_to_int_normalized_full_scale() {
        assert_eq!(1.0f32.to_native_int(16, &normalized()), 32767);
        assert_eq!((-1.0f64).to_native_int(24, &normalized()), -8388607);
        assert_eq!(0.5f32.to_native_int(8, &normalized()), 64);
    }

    #[test]
    fn test_clipping_clamps_out_of_range() {
        let settings = ConversionSettings {
            clipping: true,
            ..ConversionSettings::default()
        };
        assert_eq!(40000.0f32.to_native_int(16, &settings), 32767);
        assert_eq!((-40000.0f64).to_native_int(16, &settings), -32768);
    }

    #[test]
    fn test_no_clipping_wraps() {
        // 32768 wraps to the other end of a 16-bit range
        assert_eq!(32768.0f32.to_native_int(16, &raw()), -32768);
        assert_eq!(32767.0f32.to_native_int(16, &raw()), 32767);
    }

    #[test]
    fn test_float_native_to_int_caller() {
        assert_eq!(i16::from_native_float(1234.4, &raw()), 1234);
        assert_eq!(i16::from_native_float(1.0e9, &raw()), i16::MAX);

        let scaled = ConversionSettings {
            float_int_scale_read: true,
            ..ConversionSettings::default()
        };
        assert_eq!(i16::from_native_float(0.5, &scaled), 16384);
        assert_eq!(i32::from_native_float(-1.0, &scaled), -i32::MAX);
    }

    #[test]
    fn test_int_caller_to_float_native() {
        assert_relative_eq!(1000i16.to_native_float(&raw()), 1000.0);
        let scaled = ConversionSettings {
            int_float_scale_write: true,
            ..ConversionSettings::default()
        };
        assert_relative_eq!((-16384i16).to_native_float(&scaled), -0.5);
    }

    #[test]
    fn test_unnormalized_round_trip_is_exact() {
        for value in [-32768, -4860, -1, 0, 1, 12345, 32767] {
            let f = f32::from_native_int(value, 16, &raw());
            assert_eq!(f.to_native_int(16, &raw()), value);
            let d = f64::from_native_int(value << 8, 24, &raw());
            assert_eq!(d.to_native_int(24, &raw()), value << 8);
        }
    }
}
