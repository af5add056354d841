use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use clap::Parser;
use sdl2::{
    event::Event,
    keyboard::Keycode,
    pixels::Color,
    rect::Point,
    render::Canvas,
    video::Window,
    EventPump,
};

use chip8_vm::{Machine, DISPLAY_HEIGHT, DISPLAY_WIDTH};

mod controls;
use controls::to_key;

/// Timers decay once per step, so the machine is stepped at their 60Hz rate.
const FRAME_TIME: Duration = Duration::from_nanos(1_000_000_000 / 60);
const STEPS_PER_FRAME: usize = 1;

#[derive(Parser, Debug)]
#[command(version, about = "Runs a CHIP-8 program image", long_about = None)]
struct Args {
    /// Path to the ROM file to run.
    rom: PathBuf,

    #[arg(short, long, default_value_t = 10, help = "Window pixels per CHIP-8 pixel")]
    scale: u32,
}

/// Initialises the SDL context for events and drawing,
/// returns a canvas and event pump.
fn sdl_init(scale: u32) -> anyhow::Result<(Canvas<Window>, EventPump)> {
    let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
    let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;

    let window = video_subsystem
        .window(
            "CHIP-8",
            DISPLAY_WIDTH as u32 * scale,
            DISPLAY_HEIGHT as u32 * scale,
        )
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;
    canvas.set_scale(scale as f32, scale as f32).map_err(|e| anyhow!(e))?;

    let event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;
    Ok((canvas, event_pump))
}

fn draw(canvas: &mut Canvas<Window>, chip8: &Machine) -> anyhow::Result<()> {
    canvas.set_draw_color(Color::RGB(0, 0, 0));
    canvas.clear();
    canvas.set_draw_color(Color::RGB(255, 255, 255));

    for (row, pixels) in chip8.framebuffer().iter().enumerate() {
        for (col, &pixel) in pixels.iter().enumerate() {
            if pixel > 0 {
                canvas
                    .draw_point(Point::new(col as i32, row as i32))
                    .map_err(|e| anyhow!(e))?;
            }
        }
    }

    canvas.present();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("could not read `{}`", args.rom.display()))?;

    let mut chip8 = Machine::new();
    chip8.load(&rom)?;

    let (mut canvas, mut event_pump) = sdl_init(args.scale)?;
    let mut next_frame = Instant::now();

    // Main execution loop:
    'running: loop {
        // Check for keyboard inputs and update the keypad accordingly:
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'running,
                Event::KeyDown { keycode: Some(k), .. } => {
                    if let Some(key) = to_key(k) { chip8.key_down(key); }
                },
                Event::KeyUp { keycode: Some(k), .. } => {
                    if let Some(key) = to_key(k) { chip8.key_up(key); }
                },
                _ => {}
            }
        }

        if let Err(err) = chip8.run(STEPS_PER_FRAME) {
            log::error!("emulation stopped: {err}");
            return Err(err.into());
        }

        if chip8.tone() {
            log::info!("BEEP!");
        }

        draw(&mut canvas, &chip8)?;

        next_frame += FRAME_TIME;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    Ok(())
}
