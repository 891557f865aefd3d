#![no_main]

use libfuzzer_sys::fuzz_target;

/// Byte-flag protocol: the first four bytes are ASCII `'0'`/`'1'` flags
/// `{minify, require_terminated, formatted, buffered}`; everything after
/// is candidate JSON. Inputs of four bytes or fewer, or not
/// NUL-terminated, are rejected outright rather than exercised. A
/// panic past this point is a real bug, not an expected rejection.
fuzz_target!(|data: &[u8]| {
    if data.len() <= 4 || *data.last().unwrap() != 0 {
        return;
    }

    let minify_flag = data[0] == b'1';
    let require_terminated = data[1] == b'1';
    let formatted = data[2] == b'1';
    let buffered = data[3] == b'1';
    let body = &data[4..];

    let parse_opts = cjson_core::parser::Options {
        require_null_terminated: require_terminated,
        max_depth: cjson_core::parser::NESTING_LIMIT,
    };
    let Ok((value, _)) = cjson_core::parser::parse_with_options(body, &parse_opts) else {
        return;
    };

    let print_opts = cjson_core::printer::Options {
        pretty: formatted,
        ..Default::default()
    };
    let printed = if buffered {
        cjson_core::printer::print_bounded(&value, body.len() * 4 + 64, &print_opts)
    } else {
        cjson_core::printer::print_with_options(&value, &print_opts)
    };
    let Ok(printed) = printed else {
        return;
    };

    if minify_flag {
        let mut copy = printed.into_bytes();
        cjson_core::minify::minify(&mut copy);
    }
});
