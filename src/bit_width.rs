//! Zentrale Bitbreiten-Berechnung.
//!
//! Berechnet `⌈log₂(n)⌉` — die Anzahl Bits um `n` unterschiedliche Werte
//! zu codieren. Wird von Event Codes und der String Table verwendet. Die
//! Breite hängt von der GRÖSSE der Alternativen-Menge ab, nicht von ihren
//! Mitgliedern; deshalb tragen Grammar-Zustände ihre Menge explizit.

/// Berechnet die Anzahl Bits fuer `n` unterschiedliche Werte: `⌈log₂(n)⌉`.
///
/// - `n = 0` oder `n = 1`: 0 Bits (kein Bit noetig, Wert ist implizit)
/// - `n = 2`: 1 Bit
/// - `n = 3..4`: 2 Bits
/// - `n = 5..8`: 3 Bits
#[inline]
pub fn for_count(n: usize) -> u8 {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grundwerte() {
        assert_eq!(for_count(0), 0);
        assert_eq!(for_count(1), 0);
        assert_eq!(for_count(2), 1);
        assert_eq!(for_count(3), 2);
        assert_eq!(for_count(4), 2);
        assert_eq!(for_count(5), 3);
        assert_eq!(for_count(8), 3);
        assert_eq!(for_count(9), 4);
        assert_eq!(for_count(256), 8);
        assert_eq!(for_count(257), 9);
    }

    #[test]
    fn monoton_steigend() {
        let mut prev = 0;
        for n in 0..=4096 {
            let w = for_count(n);
            assert!(w >= prev, "width shrank at n={n}");
            prev = w;
        }
    }
}
