use std::io::Write;

const BANNER_LINES: [&str; 6] = [
    " __  __     __     ______  ",
    "/\\ \\_\\ \\   /\\ \\   /\\__  _\\ ",
    "\\ \\  __ \\  \\ \\ \\  \\/_/\\ \\/ ",
    " \\ \\_\\ \\_\\  \\ \\_\\    \\ \\_\\ ",
    "  \\/_/\\/_/   \\/_/     \\/_/ ",
    "                           ",
];

pub(crate) fn write_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    for line in BANNER_LINES {
        writeln!(out, "{}", line.trim_end())?;
    }
    writeln!(
        out,
        "hit v{} | {} | the load testing tool",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_LICENSE")
    )
}

pub(crate) fn write_plan<W: Write>(
    out: &mut W,
    requests: u64,
    url: &str,
    concurrency: usize,
) -> std::io::Result<()> {
    writeln!(
        out,
        "\nSending {} requests to \"{}\" (concurrency: {})",
        requests, url, concurrency
    )
}
