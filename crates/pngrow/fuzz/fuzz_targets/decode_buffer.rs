#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use std::io::Cursor;

    use pngrow_core::pixel::Rgba16;

    let opts = pngrow_core::options::DecoderOptions::new_fast()
        .set_max_width(4096)
        .set_max_height(4096);

    let mut decoder = pngrow::PngDecoder::new_with_options(Cursor::new(data), opts);
    let _ = decoder.decode::<Rgba16>();
});
