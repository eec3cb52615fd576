use clap::Parser;

/// Parses from the command line arguments on native and from GET parameters on web. TODO: Android settings? Just edit at runtime...?
#[allow(dead_code)]
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        // On web, parse from URL query parameters
        let location_string = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();

        let query_string = match location_string.find('?') {
            Some(query_start) => &location_string[query_start + 1..],
            None => "",
        };

        T::try_parse_from(args_from_query(query_string))
    }
}

/// Translate a page query string into an argument vector, keeping only the
/// parameters carrying the `cli` key prefix. Values are pushed even when
/// empty; a key without `=` becomes a bare flag.
#[allow(dead_code)]
fn args_from_query(query_string: &str) -> Vec<String> {
    let mut args = vec!["trip-heatmap-viewer".to_string()];

    for pair in query_string.split('&') {
        if let Some(eq_pos) = pair.find('=') {
            let key = decode_query_component(&pair[..eq_pos]);
            let value = decode_query_component(&pair[eq_pos + 1..]);
            if let Some(arg_key) = key.strip_prefix("cli")
                && !arg_key.is_empty()
            {
                args.push(format!("--{}", arg_key));
                args.push(value);
            }
        } else {
            let key = decode_query_component(pair);
            if let Some(arg_key) = key.strip_prefix("cli")
                && !arg_key.is_empty()
            {
                args.push(format!("--{}", arg_key));
            }
        }
    }

    args
}

/// Decode one query-string component: `+` becomes a space and `%XX` escapes
/// become bytes. Malformed escapes pass through undecoded.
#[allow(dead_code)]
fn decode_query_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = spaced.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            decoded.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

#[allow(dead_code)]
fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_query_translates_cli_prefixed_params() {
        assert_eq!(
            args_from_query("clitime=night&foo=bar&cliseed=7"),
            vec!["trip-heatmap-viewer", "--time", "night", "--seed", "7"]
        );
    }

    #[test]
    fn test_args_from_query_keeps_empty_values() {
        // An empty selector still reaches the variant fallback
        assert_eq!(
            args_from_query("clitime="),
            vec!["trip-heatmap-viewer", "--time", ""]
        );
    }

    #[test]
    fn test_args_from_query_key_without_value_is_a_bare_flag() {
        assert_eq!(
            args_from_query("cliignore-persisted"),
            vec!["trip-heatmap-viewer", "--ignore-persisted"]
        );
    }

    #[test]
    fn test_decode_plus_as_space() {
        assert_eq!(decode_query_component("a+b+c"), "a b c");
    }

    #[test]
    fn test_decode_percent_escapes() {
        assert_eq!(decode_query_component("day%20night"), "day night");
        assert_eq!(decode_query_component("%2Bday"), "+day");
        assert_eq!(decode_query_component("caf%C3%A9"), "café");
    }

    #[test]
    fn test_decode_passes_through_unescaped_input() {
        assert_eq!(decode_query_component("night"), "night");
    }

    #[test]
    fn test_decode_leaves_malformed_escapes_alone() {
        assert_eq!(decode_query_component("100%"), "100%");
        assert_eq!(decode_query_component("%2"), "%2");
        assert_eq!(decode_query_component("%GG"), "%GG");
    }
}
