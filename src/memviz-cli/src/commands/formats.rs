//! Color format listing

use memviz::COLOR_FORMATS;

/// Print the format registry
pub fn handle() {
    println!(
        "{:<8} {:>3}  {:<8} {:<8} {:<8} {:<8}",
        "Format", "Bpp", "Red", "Green", "Blue", "Alpha"
    );
    for format in COLOR_FORMATS {
        let [r, g, b, a] = format.channels();
        println!(
            "{:<8} {:>3}  {:<8} {:<8} {:<8} {:<8}",
            format.name,
            format.bytes_per_pixel,
            r.to_string(),
            g.to_string(),
            b.to_string(),
            a.to_string()
        );
    }
}
