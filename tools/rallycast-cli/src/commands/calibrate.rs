//! Check a court calibration.

use rallycast_match_model::geometry::Coord;
use rallycast_processing_core::perspective::PerspectiveNormalizer;

pub fn run(corners: &[Coord]) -> anyhow::Result<()> {
    let normalizer = PerspectiveNormalizer::new(corners)
        .map_err(|e| anyhow::anyhow!("Calibration rejected: {e}"))?;

    println!("Calibration accepted.");
    println!();

    println!("Homography (pixels -> meters):");
    let m = normalizer.matrix();
    for row in 0..3 {
        println!(
            "  [{:>14.6e} {:>14.6e} {:>14.6e}]",
            m[(row, 0)],
            m[(row, 1)],
            m[(row, 2)]
        );
    }
    println!();

    println!("Corners:");
    let names = ["top-left", "top-right", "bottom-right", "bottom-left"];
    let pixel = normalizer.pixel_court().corners();
    let meters = normalizer.court().corners();
    for ((name, p), c) in names.iter().zip(pixel).zip(meters) {
        println!(
            "  {name:<13} ({:>7.1}, {:>7.1}) px -> ({:>6.2}, {:>5.2}) m",
            p.x, p.y, c.x, c.y
        );
    }
    println!();

    let court = normalizer.court();
    let net_y = normalizer.pixel_court().net_line_y();
    println!("Net:");
    println!("  x = {:.3} m", court.net_x());
    println!("  Player split line: y = {net_y:.1} px");
    if let (Some(a), Some(b)) = (
        normalizer.to_pixel(Coord::new(court.net_x(), 0.0)),
        normalizer.to_pixel(Coord::new(court.net_x(), court.tr.y)),
    ) {
        println!(
            "  Net line in image: ({:.1}, {:.1}) - ({:.1}, {:.1}) px",
            a.x, a.y, b.x, b.y
        );
    }

    Ok(())
}
