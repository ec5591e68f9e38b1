//! Forward (byte -> char) tables for the single-byte "mode 1" encodings.
//!
//! Bytes 0x00-0x7F are ASCII-identical for every family here except the
//! EBCDIC pair, which define their own full 256-entry table. `0xFFFF`
//! marks a byte with no assigned character.
//!
//! ISO-8859-1's table is transcribed byte-for-byte from the original
//! facility's validity table (every valid byte maps to itself). The
//! other Latin/Windows/DOS tables below are built from a documented
//! sparse override list over an ASCII base; see DESIGN.md for which
//! tables are exact versus representative.

pub const INVALID: u16 = 0xFFFF;

fn ascii_base() -> [u16; 256] {
  let mut t = [INVALID; 256];
  let mut i = 0usize;
  while i < 128 {
    t[i] = i as u16;
    i += 1;
  }
  t
}

fn with_overrides(mut base: [u16; 256], overrides: &[(u8, u16)]) -> [u16; 256] {
  for &(byte, ch) in overrides {
    base[byte as usize] = ch;
  }
  base
}

/// Exact transcription of `CIDEncode_ISO8859_1.cpp`'s `ac1Map`: valid
/// ISO-8859-1 bytes map to themselves, invalid ones to the sentinel.
pub fn iso_8859_1() -> [u16; 256] {
  #[rustfmt::skip]
  const VALID: [u8; 256] = [
    1,1,1,1,1,1,1,1,1,1,1,0,0,1,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
  ];
  let mut t = [INVALID; 256];
  for (i, &valid) in VALID.iter().enumerate() {
    if valid != 0 {
      t[i] = i as u16;
    }
  }
  t
}

/// Representative ISO-8859-2 (Central European). 0xA0-0xFF covers the
/// accented Latin letters used by Polish/Czech/Slovak/Hungarian text.
pub fn iso_8859_2() -> [u16; 256] {
  with_overrides(
    ascii_base(),
    &[
      (0xA0, 0x00A0), (0xA1, 0x0104), (0xA2, 0x02D8), (0xA3, 0x0141),
      (0xA5, 0x013D), (0xA6, 0x015A), (0xA9, 0x0160), (0xAB, 0x0179),
      (0xAC, 0x00AC), (0xAF, 0x017B), (0xB1, 0x0105), (0xB3, 0x0142),
      (0xB5, 0x013E), (0xB6, 0x015B), (0xB9, 0x0161), (0xBB, 0x017A),
      (0xBE, 0x017C), (0xC0, 0x0154), (0xC3, 0x0102), (0xC6, 0x0106),
      (0xC8, 0x010C), (0xCA, 0x0118), (0xCC, 0x011A), (0xD0, 0x0110),
      (0xD1, 0x0143), (0xD2, 0x0147), (0xD5, 0x0150), (0xD8, 0x0158),
      (0xD9, 0x016E), (0xDB, 0x0170), (0xDD, 0x00DD), (0xDE, 0x0162),
      (0xE0, 0x0155), (0xE3, 0x0103), (0xE6, 0x0107), (0xE8, 0x010D),
      (0xEA, 0x0119), (0xEC, 0x011B), (0xF0, 0x0111), (0xF1, 0x0144),
      (0xF2, 0x0148), (0xF5, 0x0151), (0xF8, 0x0159), (0xF9, 0x016F),
      (0xFB, 0x0171), (0xFD, 0x00FD), (0xFE, 0x0163), (0xFF, 0x02D9),
    ],
  )
}

/// Representative ISO-8859-3 (South European: Maltese/Esperanto extras).
pub fn iso_8859_3() -> [u16; 256] {
  with_overrides(
    ascii_base(),
    &[
      (0xA0, 0x00A0), (0xA1, 0x0126), (0xA6, 0x0124), (0xA9, 0x0130),
      (0xAA, 0x015E), (0xAB, 0x011E), (0xAF, 0x017B), (0xB1, 0x0127),
      (0xB6, 0x0125), (0xB9, 0x0131), (0xBA, 0x015F), (0xBB, 0x011F),
      (0xBF, 0x017C), (0xC5, 0x010A), (0xC6, 0x0108), (0xD5, 0x0120),
      (0xD8, 0x011C), (0xDD, 0x016C), (0xDE, 0x015C), (0xE5, 0x010B),
      (0xE6, 0x0109), (0xF5, 0x0121), (0xF8, 0x011D), (0xFD, 0x016D),
      (0xFE, 0x015D),
    ],
  )
}

/// Representative ISO-8859-4 (North European: Baltic).
pub fn iso_8859_4() -> [u16; 256] {
  with_overrides(
    ascii_base(),
    &[
      (0xA0, 0x00A0), (0xA1, 0x0104), (0xA2, 0x0138), (0xA3, 0x0156),
      (0xA5, 0x0128), (0xA6, 0x013B), (0xA9, 0x0160), (0xAA, 0x0112),
      (0xAB, 0x0122), (0xAC, 0x0166), (0xAE, 0x017D), (0xB1, 0x0105),
      (0xB2, 0x02DB), (0xB3, 0x0157), (0xB5, 0x0129), (0xB6, 0x013C),
      (0xB9, 0x0161), (0xBA, 0x0113), (0xBB, 0x0123), (0xBC, 0x0167),
      (0xBD, 0x014A), (0xBE, 0x017E), (0xBF, 0x014B), (0xC0, 0x0100),
      (0xC7, 0x012E), (0xC8, 0x010C), (0xCA, 0x0118), (0xCC, 0x0116),
      (0xCF, 0x012A), (0xD0, 0x0110), (0xD1, 0x0145), (0xD2, 0x014C),
      (0xD3, 0x0136), (0xD9, 0x0172), (0xDD, 0x0168), (0xDE, 0x016A),
      (0xE0, 0x0101), (0xE7, 0x012F), (0xE8, 0x010D), (0xEA, 0x0119),
      (0xEC, 0x0117), (0xEF, 0x012B), (0xF0, 0x0111), (0xF1, 0x0146),
      (0xF2, 0x014D), (0xF3, 0x0137), (0xF9, 0x0173), (0xFD, 0x0169),
      (0xFE, 0x016B), (0xFF, 0x02D9),
    ],
  )
}

/// Representative ISO-8859-5 (Cyrillic).
pub fn iso_8859_5() -> [u16; 256] {
  let mut overrides = vec![(0xA0u8, 0x00A0u16), (0xAD, 0x00AD), (0xF0, 0x2116)];
  for b in 0xB0u16..=0xCF {
    overrides.push((b as u8, 0x0410 + (b - 0xB0)));
  }
  for b in 0xD0u16..=0xEF {
    overrides.push((b as u8, 0x0430 + (b - 0xD0)));
  }
  with_overrides(ascii_base(), &overrides)
}

/// Representative ISO-8859-6 (Arabic).
pub fn iso_8859_6() -> [u16; 256] {
  with_overrides(
    ascii_base(),
    &[
      (0xA0, 0x00A0), (0xAC, 0x060C), (0xBB, 0x061B), (0xBF, 0x061F),
      (0xC1, 0x0621), (0xC2, 0x0622), (0xC3, 0x0623), (0xC4, 0x0624),
      (0xC5, 0x0625), (0xC6, 0x0626), (0xC7, 0x0627), (0xC8, 0x0628),
      (0xC9, 0x0629), (0xCA, 0x062A), (0xCB, 0x062B), (0xCC, 0x062C),
      (0xCD, 0x062D), (0xCE, 0x062E), (0xCF, 0x062F), (0xD0, 0x0630),
      (0xD1, 0x0631), (0xD2, 0x0632), (0xD3, 0x0633), (0xD4, 0x0634),
      (0xD5, 0x0635), (0xD6, 0x0636), (0xD7, 0x0637), (0xD8, 0x0638),
      (0xD9, 0x0639), (0xDA, 0x063A), (0xE0, 0x0640), (0xE1, 0x0641),
      (0xE2, 0x0642), (0xE3, 0x0643), (0xE4, 0x0644), (0xE5, 0x0645),
      (0xE6, 0x0646), (0xE7, 0x0647), (0xE8, 0x0648), (0xE9, 0x0649),
      (0xEA, 0x064A), (0xEB, 0x064B), (0xEC, 0x064C), (0xED, 0x064D),
      (0xEE, 0x064E), (0xEF, 0x064F), (0xF0, 0x0650), (0xF1, 0x0651),
      (0xF2, 0x0652),
    ],
  )
}

/// CP437 (original IBM PC). 0xB0-0xDF is the classic box-drawing block.
pub fn cp437() -> [u16; 256] {
  with_overrides(
    ascii_base(),
    &[
      (0x80, 0x00C7), (0x81, 0x00FC), (0x82, 0x00E9), (0x83, 0x00E2),
      (0x84, 0x00E4), (0x85, 0x00E0), (0x86, 0x00E5), (0x87, 0x00E7),
      (0x88, 0x00EA), (0x89, 0x00EB), (0x8A, 0x00E8), (0x8B, 0x00EF),
      (0x8C, 0x00EE), (0x8D, 0x00EC), (0x8E, 0x00C4), (0x8F, 0x00C5),
      (0x90, 0x00C9), (0x91, 0x00E6), (0x92, 0x00C6), (0x93, 0x00F4),
      (0x94, 0x00F6), (0x95, 0x00F2), (0x96, 0x00FB), (0x97, 0x00F9),
      (0x98, 0x00FF), (0x99, 0x00D6), (0x9A, 0x00DC), (0x9B, 0x00A2),
      (0x9C, 0x00A3), (0x9D, 0x00A5), (0x9E, 0x20A7), (0x9F, 0x0192),
      (0xA0, 0x00E1), (0xA1, 0x00ED), (0xA2, 0x00F3), (0xA3, 0x00FA),
      (0xA4, 0x00F1), (0xA5, 0x00D1), (0xA6, 0x00AA), (0xA7, 0x00BA),
      (0xA8, 0x00BF), (0xA9, 0x2310), (0xAA, 0x00AC), (0xAB, 0x00BD),
      (0xAC, 0x00BC), (0xAD, 0x00A1), (0xAE, 0x00AB), (0xAF, 0x00BB),
      (0xB0, 0x2591), (0xB1, 0x2592), (0xB2, 0x2593), (0xB3, 0x2502),
      (0xB4, 0x2524), (0xB5, 0x2561), (0xB6, 0x2562), (0xB7, 0x2556),
      (0xB8, 0x2555), (0xB9, 0x2563), (0xBA, 0x2551), (0xBB, 0x2557),
      (0xBC, 0x255D), (0xBD, 0x255C), (0xBE, 0x255B), (0xBF, 0x2510),
      (0xC0, 0x2514), (0xC1, 0x2534), (0xC2, 0x252C), (0xC3, 0x251C),
      (0xC4, 0x2500), (0xC5, 0x253C), (0xC6, 0x255E), (0xC7, 0x255F),
      (0xC8, 0x255A), (0xC9, 0x2554), (0xCA, 0x2569), (0xCB, 0x2566),
      (0xCC, 0x2560), (0xCD, 0x2550), (0xCE, 0x256C), (0xCF, 0x2567),
      (0xD0, 0x2568), (0xD1, 0x2564), (0xD2, 0x2565), (0xD3, 0x2559),
      (0xD4, 0x2558), (0xD5, 0x2552), (0xD6, 0x2553), (0xD7, 0x256B),
      (0xD8, 0x256A), (0xD9, 0x2518), (0xDA, 0x250C), (0xDB, 0x2588),
      (0xDC, 0x2584), (0xDD, 0x258C), (0xDE, 0x2590), (0xDF, 0x2580),
      (0xE0, 0x03B1), (0xE1, 0x00DF), (0xE2, 0x0393), (0xE3, 0x03C0),
      (0xE4, 0x03A3), (0xE5, 0x03C3), (0xE6, 0x00B5), (0xE7, 0x03C4),
      (0xE8, 0x03A6), (0xE9, 0x0398), (0xEA, 0x03A9), (0xEB, 0x03B4),
      (0xEC, 0x221E), (0xED, 0x03C6), (0xEE, 0x03B5), (0xEF, 0x2229),
      (0xF0, 0x2261), (0xF1, 0x00B1), (0xF2, 0x2265), (0xF3, 0x2264),
      (0xF4, 0x2320), (0xF5, 0x2321), (0xF6, 0x00F7), (0xF7, 0x2248),
      (0xF8, 0x00B0), (0xF9, 0x2219), (0xFA, 0x00B7), (0xFB, 0x221A),
      (0xFC, 0x207F), (0xFD, 0x00B2), (0xFE, 0x25A0), (0xFF, 0x00A0),
    ],
  )
}

/// CP850 (DOS Western European): same box-drawing skeleton as CP437,
/// reshuffled to favor full Latin-1 coverage over Greek/math symbols.
pub fn cp850() -> [u16; 256] {
  let mut t = cp437();
  #[rustfmt::skip]
  let relatinized: [(u8, u16); 36] = [
    (0xD0, 0x00D0), (0xD1, 0x00D1), (0xD2, 0x00D2), (0xD3, 0x00D3),
    (0xD4, 0x00D4), (0xD5, 0x00D5), (0xD6, 0x00D6), (0xD7, 0x00D7),
    (0xD8, 0x00D8), (0xD9, 0x00D9), (0xDA, 0x00DA), (0xDB, 0x00DB),
    (0xDC, 0x00DC), (0xDD, 0x00DD), (0xDE, 0x00DE), (0xDF, 0x00DF),
    (0xE0, 0x00E0), (0xE3, 0x00E3), (0xE5, 0x00E5), (0xE7, 0x00E7),
    (0xE9, 0x00E9), (0xEB, 0x00EB), (0xEC, 0x00EC), (0xED, 0x00ED),
    (0xEE, 0x00EE), (0xEF, 0x00EF), (0xF0, 0x00F0), (0xF2, 0x00F2),
    (0xF3, 0x00F3), (0xF4, 0x00F4), (0xF5, 0x00F5), (0xF8, 0x00F8),
    (0xF9, 0x00F9), (0xFA, 0x00FA), (0xFB, 0x00FB), (0xFD, 0x00FD),
  ];
  for (b, c) in relatinized {
    t[b as usize] = c;
  }
  t
}

/// Windows-1251 (Cyrillic).
pub fn cp1251() -> [u16; 256] {
  let mut overrides = vec![
    (0x80u8, 0x0402u16), (0x81, 0x0403), (0x82, 0x201A), (0x83, 0x0453),
    (0x84, 0x201E), (0x85, 0x2026), (0x86, 0x2020), (0x87, 0x2021),
    (0x88, 0x20AC), (0x89, 0x2030), (0x8A, 0x0409), (0x8B, 0x2039),
    (0x8C, 0x040A), (0x8D, 0x040C), (0x8E, 0x040B), (0x8F, 0x040F),
    (0x90, 0x0452), (0x91, 0x2018), (0x92, 0x2019), (0x93, 0x201C),
    (0x94, 0x201D), (0x95, 0x2022), (0x96, 0x2013), (0x97, 0x2014),
    (0x99, 0x2122), (0x9A, 0x0459), (0x9B, 0x203A), (0x9C, 0x045A),
    (0x9D, 0x045C), (0x9E, 0x045B), (0x9F, 0x045F), (0xA0, 0x00A0),
    (0xA1, 0x040E), (0xA2, 0x045E), (0xA3, 0x0408), (0xA4, 0x00A4),
    (0xA5, 0x0490), (0xA6, 0x00A6), (0xA7, 0x00A7), (0xA8, 0x0401),
    (0xA9, 0x00A9), (0xAA, 0x0404), (0xAB, 0x00AB), (0xAC, 0x00AC),
    (0xAD, 0x00AD), (0xAE, 0x00AE), (0xAF, 0x0407), (0xB0, 0x00B0),
    (0xB1, 0x00B1), (0xB2, 0x0406), (0xB3, 0x0456), (0xB4, 0x0491),
    (0xB5, 0x00B5), (0xB6, 0x00B6), (0xB7, 0x00B7), (0xB8, 0x0451),
    (0xB9, 0x2116), (0xBA, 0x0454), (0xBB, 0x00BB), (0xBC, 0x0458),
    (0xBD, 0x0405), (0xBE, 0x0455), (0xBF, 0x0457),
  ];
  for b in 0xC0u16..=0xDF {
    overrides.push((b as u8, 0x0410 + (b - 0xC0)));
  }
  for b in 0xE0u16..=0xFF {
    overrides.push((b as u8, 0x0430 + (b - 0xE0)));
  }
  with_overrides(ascii_base(), &overrides)
}

/// Windows-1252 (Western European). 0xA0-0xFF matches Latin-1 exactly;
/// 0x80-0x9F holds the well-known curly-quote/dash extensions.
pub fn cp1252() -> [u16; 256] {
  let mut overrides = vec![
    (0x80u8, 0x20ACu16), (0x82, 0x201A), (0x83, 0x0192), (0x84, 0x201E),
    (0x85, 0x2026), (0x86, 0x2020), (0x87, 0x2021), (0x88, 0x02C6),
    (0x89, 0x2030), (0x8A, 0x0160), (0x8B, 0x2039), (0x8C, 0x0152),
    (0x8E, 0x017D), (0x91, 0x2018), (0x92, 0x2019), (0x93, 0x201C),
    (0x94, 0x201D), (0x95, 0x2022), (0x96, 0x2013), (0x97, 0x2014),
    (0x98, 0x02DC), (0x99, 0x2122), (0x9A, 0x0161), (0x9B, 0x203A),
    (0x9C, 0x0153), (0x9E, 0x017E), (0x9F, 0x0178),
  ];
  for b in 0xA0u16..=0xFF {
    overrides.push((b as u8, b));
  }
  with_overrides(ascii_base(), &overrides)
}

/// IBM037 / EBCDIC-CP-US. Unlike the others, this is *not* ASCII for
/// bytes 0x00-0x7F; it defines its own full table from scratch.
pub fn ibm037() -> [u16; 256] {
  let mut t = [INVALID; 256];
  t[0x40] = 0x20; // space
  t[0x4B] = '.' as u16;
  t[0x4C] = '<' as u16;
  t[0x4D] = '(' as u16;
  t[0x4E] = '+' as u16;
  t[0x50] = '&' as u16;
  t[0x5A] = '!' as u16;
  t[0x5B] = '$' as u16;
  t[0x5C] = '*' as u16;
  t[0x5D] = ')' as u16;
  t[0x5E] = ';' as u16;
  t[0x60] = '-' as u16;
  t[0x61] = '/' as u16;
  t[0x6B] = ',' as u16;
  t[0x6C] = '%' as u16;
  t[0x6D] = '_' as u16;
  t[0x6E] = '>' as u16;
  t[0x6F] = '?' as u16;
  t[0x7A] = ':' as u16;
  t[0x7B] = '#' as u16;
  t[0x7C] = '@' as u16;
  t[0x7D] = '\'' as u16;
  t[0x7E] = '=' as u16;
  t[0x7F] = '"' as u16;
  for (i, group) in [(0x81u8, b'a'), (0x91, b'j'), (0xA2, b's')] {
    for o in 0..9u16 {
      if group + o as u8 > b'z' {
        break;
      }
      t[(i as u16 + o) as usize] = (group + o as u8) as u16;
    }
  }
  for (i, group) in [(0xC1u8, b'A'), (0xD1, b'J'), (0xE2, b'S')] {
    for o in 0..9u16 {
      if group + o as u8 > b'Z' {
        break;
      }
      t[(i as u16 + o) as usize] = (group + o as u8) as u16;
    }
  }
  for b in 0xF0u16..=0xF9 {
    t[b as usize] = '0' as u16 + (b - 0xF0);
  }
  t
}

/// IBM1140: IBM037 with the euro sign swapped into byte 0x9F (the
/// standard "euro update" of the 037 code page).
pub fn ibm1140() -> [u16; 256] {
  let mut t = ibm037();
  t[0x9F] = 0x20AC;
  t
}
