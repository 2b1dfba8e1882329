//! The CRC32 used by PNG chunk records (polynomial `0xEDB88320`).

const CRC_TABLE: [u32; 256] = {
  let mut table = [0_u32; 256];
  let mut n = 0;
  while n < 256 {
    let mut c: u32 = n as _;
    let mut k = 0;
    while k < 8 {
      c = if (c & 1) != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
      k += 1;
    }
    table[n] = c;
    //
    n += 1;
  }
  table
};

/// Runs the PNG CRC32 over `parts` as if they were one continuous byte
/// sequence. A chunk's CRC covers its type code followed by its data, so the
/// caller passes those as two parts without gluing them together first.
#[inline]
pub(crate) fn crc32_over(parts: &[&[u8]]) -> u32 {
  let mut c = u32::MAX;
  for part in parts {
    for &byte in *part {
      let i = ((c ^ u32::from(byte)) & 0xFF) as usize;
      c = CRC_TABLE[i] ^ (c >> 8);
    }
  }
  c ^ u32::MAX
}
