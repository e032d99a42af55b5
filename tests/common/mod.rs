#[allow(dead_code)]
pub fn init_logger() {
    // several tests share one process, only the first init wins
    let _ = simple_logger::init_with_level(log::Level::Debug);
}

/// parse `row,col,value` lines back into tuples
#[allow(dead_code)]
pub fn parse_records(text: &str) -> Vec<(u16, u16, i32)> {
    text.lines()
        .map(|line| {
            let mut fields = line.split(',');
            (
                fields.next().unwrap().parse().unwrap(),
                fields.next().unwrap().parse().unwrap(),
                fields.next().unwrap().parse().unwrap(),
            )
        })
        .collect()
}
