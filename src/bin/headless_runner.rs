// Headless 6502 runner
// Usage:
//   cargo run --release --bin headless_runner -- image.bin --load 0x8000 --steps 100000 --trace
// Also reads TRACE, MAX_STEPS, REPORT_UNMAPPED, OPEN_BUS_LAST, DECIMAL_MODE.

use std::env;
use std::path::PathBuf;
use std::process;

use jazzness_core::config::{parse_u16, parse_u64};
use jazzness_core::cpu::RESET_VECTOR;
use jazzness_core::trace::trace_line;
use jazzness_core::{Bus, Cpu, CpuBus, CpuError, Ram, RunnerConfig};

struct Args {
    image: PathBuf,
    load: Option<u16>,
    start: Option<u16>,
    steps: Option<u64>,
    trace: bool,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <image> [--load ADDR] [--start ADDR] [--steps N] [--trace]",
        program
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("headless_runner");
    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        usage(program);
    }

    let mut image = None;
    let mut load = None;
    let mut start = None;
    let mut steps = None;
    let mut trace = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            opt @ ("--load" | "--start" | "--steps") => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("{} requires a value", opt);
                    process::exit(2);
                };
                let ok = match opt {
                    "--load" => {
                        load = parse_u16(value);
                        load.is_some()
                    }
                    "--start" => {
                        start = parse_u16(value);
                        start.is_some()
                    }
                    _ => {
                        steps = parse_u64(value);
                        steps.is_some()
                    }
                };
                if !ok {
                    eprintln!("{}: invalid value '{}'", opt, value);
                    process::exit(2);
                }
                i += 2;
            }
            "--trace" => {
                trace = true;
                i += 1;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                process::exit(2);
            }
            s => {
                image = Some(PathBuf::from(s));
                i += 1;
            }
        }
    }

    let Some(image) = image else {
        eprintln!("image argument missing");
        usage(program);
    };
    Args {
        image,
        load,
        start,
        steps,
        trace,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let mut config = RunnerConfig::from_env();
    config.trace |= args.trace;
    if let Some(steps) = args.steps {
        config.max_steps = steps;
    }

    let image = match std::fs::read(&args.image) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.image.display(), e);
            process::exit(1);
        }
    };
    if image.is_empty() || image.len() > 0x10000 {
        eprintln!("Image must be 1..=65536 bytes, got {}", image.len());
        process::exit(1);
    }

    // A full 64 KiB dump goes at $0000, anything smaller defaults to $8000.
    let load = args
        .load
        .unwrap_or(if image.len() == 0x10000 { 0x0000 } else { 0x8000 });
    let end = load as usize + image.len();
    if end > 0x10000 {
        eprintln!(
            "Image of {} bytes does not fit at ${:04X}",
            image.len(),
            load
        );
        process::exit(1);
    }

    let mut bus = Bus::new(config.bus_config());
    if let Err(e) = bus.map(0x0000..=0xFFFF, Ram::new(0x10000)) {
        eprintln!("Failed to map RAM: {}", e);
        process::exit(1);
    }
    bus.load(load, &image);

    let covers_vector = (load as usize) <= RESET_VECTOR as usize && end > RESET_VECTOR as usize + 1;
    if !covers_vector {
        let [lo, hi] = load.to_le_bytes();
        bus.write_u8(RESET_VECTOR, lo);
        bus.write_u8(RESET_VECTOR + 1, hi);
    }

    let mut cpu = Cpu::boot(config.cpu_config(), &mut bus);
    if let Some(start) = args.start {
        cpu.pc = start;
    }
    log::info!(
        "loaded {} bytes at ${:04X}, starting at ${:04X}",
        image.len(),
        load,
        cpu.pc
    );

    let mut executed = 0u64;
    let mut exit_code = 0;
    while executed < config.max_steps {
        if config.trace {
            println!("{}", trace_line(&cpu, &bus));
        }
        let pc = cpu.pc;
        match cpu.step(&mut bus) {
            Ok(_) => executed += 1,
            Err(CpuError::Halted { pc }) => {
                log::info!("cpu halted at ${:04X}", pc);
                break;
            }
            Err(e @ CpuError::Decode { .. }) => {
                log::error!("{}", e);
                exit_code = 1;
                break;
            }
        }
        if cpu.is_halted() {
            log::info!("cpu halted at ${:04X}", cpu.pc);
            break;
        }
        // `JMP *` and `Bxx *` are how test images signal completion.
        if cpu.pc == pc {
            log::info!("trapped at ${:04X}", pc);
            break;
        }
    }

    for event in bus.take_events() {
        log::debug!("bus event: {:?}", event);
    }

    let regs = cpu.inspect();
    log::info!(
        "{} instructions, {} cycles; PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
        executed,
        cpu.cycles(),
        regs.pc,
        regs.a,
        regs.x,
        regs.y,
        regs.status,
        regs.sp
    );
    process::exit(exit_code);
}
