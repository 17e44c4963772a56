//! Computer keyboard to note mapping.
//!
//! One octave from C4 to C5 laid out the way most soft synths do it: the home
//! row plays the white keys and the row above plays the black keys.
//!
//! ```text
//!    w   e       t   y   u
//!  a   s   d   f   g   h   j   k
//!  C   D   E   F   G   A   B   C
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEntry {
    pub key_id: char,
    pub note_name: &'static str,
    pub frequency_hz: f32,
    pub key_class: KeyClass,
    /// Horizontal position in white-key widths, for drawing a keyboard.
    pub visual_offset: f32,
}

const fn white(key_id: char, note_name: &'static str, frequency_hz: f32, offset: f32) -> NoteEntry {
    NoteEntry {
        key_id,
        note_name,
        frequency_hz,
        key_class: KeyClass::White,
        visual_offset: offset,
    }
}

const fn black(key_id: char, note_name: &'static str, frequency_hz: f32, offset: f32) -> NoteEntry {
    NoteEntry {
        key_id,
        note_name,
        frequency_hz,
        key_class: KeyClass::Black,
        visual_offset: offset,
    }
}

pub const KEYMAP: [NoteEntry; 13] = [
    white('a', "C4", 261.63, 0.0),
    black('w', "C#4", 277.18, 0.7),
    white('s', "D4", 293.66, 1.0),
    black('e', "D#4", 311.13, 1.7),
    white('d', "E4", 329.63, 2.0),
    white('f', "F4", 349.23, 3.0),
    black('t', "F#4", 369.99, 3.7),
    white('g', "G4", 392.00, 4.0),
    black('y', "G#4", 415.30, 4.7),
    white('h', "A4", 440.00, 5.0),
    black('u', "A#4", 466.16, 5.7),
    white('j', "B4", 493.88, 6.0),
    white('k', "C5", 523.25, 7.0),
];

/// Find the note bound to `key_id`. Matching is case-sensitive.
pub fn lookup(key_id: char) -> Option<NoteEntry> {
    KEYMAP.iter().find(|entry| entry.key_id == key_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_maps_to_c4() {
        let entry = lookup('a').expect("a is mapped");
        assert_eq!(entry.note_name, "C4");
        assert!((entry.frequency_hz - 261.63).abs() < 1e-3);
        assert_eq!(entry.key_class, KeyClass::White);
    }

    #[test]
    fn unmapped_keys_return_none() {
        assert_eq!(lookup('z'), None);
        assert_eq!(lookup('A'), None);
        assert_eq!(lookup(' '), None);
    }

    #[test]
    fn key_ids_are_unique() {
        for (i, a) in KEYMAP.iter().enumerate() {
            for b in &KEYMAP[i + 1..] {
                assert_ne!(a.key_id, b.key_id);
            }
        }
    }

    #[test]
    fn frequencies_rise_by_semitones() {
        for pair in KEYMAP.windows(2) {
            let ratio = pair[1].frequency_hz / pair[0].frequency_hz;
            assert!(
                (ratio - 2f32.powf(1.0 / 12.0)).abs() < 1e-3,
                "{} -> {}: ratio {ratio}",
                pair[0].note_name,
                pair[1].note_name
            );
        }
    }

    #[test]
    fn octave_spans_c4_to_c5() {
        let c5 = lookup('k').expect("k is mapped");
        let c4 = lookup('a').expect("a is mapped");
        assert!((c5.frequency_hz / c4.frequency_hz - 2.0).abs() < 1e-3);
    }
}
