//! Show detection stream information.

use std::path::PathBuf;

use rallycast_common::{FrameClock, DEFAULT_FPS};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let stream = super::load_stream(&path)?;
    let header = &stream.header;
    let clock = FrameClock::new(header.fps.unwrap_or(DEFAULT_FPS));

    println!("Detection stream: {}", path.display());
    println!("  Schema version: {}", header.schema_version);
    match header.fps {
        Some(fps) => println!("  FPS: {fps}"),
        None => println!("  FPS: not recorded (assuming {DEFAULT_FPS})"),
    }
    println!(
        "  Frames: {} ({:.1}s)",
        stream.frames.len(),
        clock.frame_to_secs(stream.frames.len() as u64 + 1)
    );
    println!();

    println!("Court corners (px):");
    for c in &header.court {
        println!("  ({:.1}, {:.1})", c.x, c.y);
    }
    if header.court.len() != 4 {
        println!(
            "  Warning: expected 4 corners, found {}",
            header.court.len()
        );
    }
    println!();

    let frames_with_ball = stream
        .frames
        .iter()
        .filter(|f| !f.balls.is_empty())
        .count();
    let ball_candidates: usize = stream.frames.iter().map(|f| f.balls.len()).sum();
    let person_candidates: usize = stream.frames.iter().map(|f| f.people.len()).sum();
    let max_people = stream
        .frames
        .iter()
        .map(|f| f.people.len())
        .max()
        .unwrap_or(0);

    println!("Detections:");
    println!(
        "  Frames with a ball candidate: {} / {}",
        frames_with_ball,
        stream.frames.len()
    );
    println!("  Ball candidates: {ball_candidates}");
    println!("  Person candidates: {person_candidates} (max {max_people} per frame)");

    Ok(())
}
