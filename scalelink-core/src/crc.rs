//! CRC-16 algorithms used by the two framing schemes
//!
//! - Variant A guards binary packets. It is an MSB-first CRC over polynomial
//!   0x1021 with initial value 0, but the data byte is folded into the low end
//!   of the register after the table step instead of into the high end, so it
//!   does NOT match CRC-16/XMODEM or any other catalogued CCITT variant.
//! - Variant B guards ASCII frames. It is the reflected CRC-16 with initial
//!   value 0xFFFF and polynomial 0xA001 (CRC-16/MODBUS), appended little-endian.
//!
//! Both are table driven. The tables are built at compile time from the
//! bit-serial definitions below.

/// Table for variant A, indexed by the high byte of the running CRC
const TABLE_A: [u16; 256] = build_table_a();

/// Table for variant B, indexed by the low byte of `crc ^ data`
const TABLE_B: [u16; 256] = build_table_b();

const fn build_table_a() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut top = 0;
    while top < 256 {
        let mut temp = (top as u16) << 8;
        let mut acc: u16 = 0;
        let mut bit = 0;
        while bit < 8 {
            if (temp ^ acc) & 0x8000 != 0 {
                acc = (acc << 1) ^ 0x1021;
            } else {
                acc <<= 1;
            }
            temp <<= 1;
            bit += 1;
        }
        table[top] = acc;
        top += 1;
    }
    table
}

const fn build_table_b() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = index as u16;
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// Calculate the binary packet CRC (variant A)
///
/// # Algorithm
///
/// ```text
/// crc = 0
/// for byte in data:
///     acc  = 0
///     temp = (crc >> 8) << 8
///     repeat 8:
///         acc  = (acc << 1) ^ 0x1021  if (temp ^ acc) & 0x8000  else  acc << 1
///         temp = temp << 1
///     crc = acc ^ (crc << 8) ^ byte
/// ```
///
/// # Examples
///
/// ```
/// use scalelink_core::crc;
///
/// assert_eq!(crc::crc_variant_a(b"123456789"), 0xBEEF);
/// ```
#[must_use]
pub fn crc_variant_a(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        TABLE_A[usize::from(crc >> 8)] ^ (crc << 8) ^ u16::from(byte)
    })
}

/// Calculate the ASCII frame CRC (variant B, CRC-16/MODBUS)
///
/// # Examples
///
/// ```
/// use scalelink_core::crc;
///
/// assert_eq!(crc::crc_variant_b(b"123456789"), 0x4B37);
/// ```
#[must_use]
pub fn crc_variant_b(data: &[u8]) -> u16 {
    data.iter().fold(0xFFFFu16, |crc, &byte| {
        (crc >> 8) ^ TABLE_B[usize::from((crc ^ u16::from(byte)) & 0x00FF)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Bit-serial form of variant A
    fn reference_a(data: &[u8]) -> u16 {
        let mut crc: u16 = 0;
        for &byte in data {
            let mut acc: u16 = 0;
            let mut temp: u16 = (crc >> 8) << 8;
            for _ in 0..8 {
                if (temp ^ acc) & 0x8000 != 0 {
                    acc = (acc << 1) ^ 0x1021;
                } else {
                    acc <<= 1;
                }
                temp <<= 1;
            }
            crc = acc ^ (crc << 8) ^ u16::from(byte);
        }
        crc
    }

    /// Bit-serial form of variant B
    fn reference_b(data: &[u8]) -> u16 {
        let mut crc: u16 = 0xFFFF;
        for &byte in data {
            crc ^= u16::from(byte);
            for _ in 0..8 {
                if crc & 0x0001 != 0 {
                    crc = (crc >> 1) ^ 0xA001;
                } else {
                    crc >>= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn test_variant_a_golden_vectors() {
        assert_eq!(crc_variant_a(&[]), 0x0000);
        assert_eq!(crc_variant_a(&[0x00]), 0x0000);
        assert_eq!(crc_variant_a(&[0xA0]), 0x00A0);
        assert_eq!(crc_variant_a(&[0x91, 0x04]), 0x9104);
        assert_eq!(crc_variant_a(b"123456789"), 0xBEEF);
        assert_eq!(crc_variant_a(b"scale"), 0xCFC3);
        assert_eq!(crc_variant_a(&[0x10, 0xAE, 0xB0, 0x00, 0x00, 0x01, 0x01]), 0xB388);
        assert_eq!(crc_variant_a(&[0xFF; 64]), 0x0EAB);

        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(crc_variant_a(&all), 0x33FC);
    }

    #[test]
    fn test_variant_b_golden_vectors() {
        assert_eq!(crc_variant_b(&[]), 0xFFFF);
        assert_eq!(crc_variant_b(&[0x00]), 0x40BF);
        assert_eq!(crc_variant_b(b"123456789"), 0x4B37);
        assert_eq!(crc_variant_b(b"scale"), 0x7A83);
        assert_eq!(crc_variant_b(&[0x02, 0x01, b'R', 0x03]), 0x3D2D);
        assert_eq!(crc_variant_b(&[0xFF; 64]), 0xBF01);

        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(crc_variant_b(&all), 0xDE6C);
    }

    #[test]
    fn test_variants_differ() {
        assert_ne!(crc_variant_a(b"123456789"), crc_variant_b(b"123456789"));
    }

    #[test]
    fn test_variant_a_is_not_xmodem() {
        // CRC-16/XMODEM check value is 0x31C3
        assert_ne!(crc_variant_a(b"123456789"), 0x31C3);
    }

    proptest! {
        #[test]
        fn table_a_matches_bitwise(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
            prop_assert_eq!(crc_variant_a(&data), reference_a(&data));
        }

        #[test]
        fn table_b_matches_bitwise(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
            prop_assert_eq!(crc_variant_b(&data), reference_b(&data));
        }

        #[test]
        fn crc_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..=256)) {
            prop_assert_eq!(crc_variant_a(&data), crc_variant_a(&data));
            prop_assert_eq!(crc_variant_b(&data), crc_variant_b(&data));
        }
    }
}
