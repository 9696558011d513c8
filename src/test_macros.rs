#[macro_export]
macro_rules! reader_from_bytes {
    ($b : expr) => {{
        let buffer: &[u8] = $b.as_bytes();
        BufReader::new(buffer)
    }};
}

#[macro_export]
macro_rules! parsed {
    ($s : expr) => {{
        $crate::parse($s).unwrap()
    }};
}
