use glc::gl;
use glc::sdl2;
use glc::sdl2::event::Event;
use glc::sdl2::video::GLProfile;
use glc::GlDriver;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const SCREEN_WIDTH: u32 = 800;
const SCREEN_HEIGHT: u32 = 600;
mod triangle;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sdl_context = sdl2::init().unwrap();
    let video_subsystem = sdl_context.video().unwrap();

    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::Core);

    // OpenGL 3.2 is the minimum that we will support.
    gl_attr.set_context_version(3, 2);

    let window = video_subsystem
        .window("Demo: glc shader program and uniforms", SCREEN_WIDTH, SCREEN_HEIGHT)
        .opengl()
        .build()
        .unwrap();

    // Create a window context
    let _ctx = window.gl_create_context().unwrap();
    // SAFETY: the context above is current on this thread for the whole loop.
    let driver = unsafe { GlDriver::from_sdl2(&video_subsystem) };

    debug_assert_eq!(gl_attr.context_profile(), GLProfile::Core);
    debug_assert_eq!(gl_attr.context_version(), (3, 2));

    let triangle = match triangle::Triangle::new(&driver) {
        Ok(triangle) => triangle,
        Err(err) => {
            eprintln!("Failed to build the triangle program: {}", err);
            std::process::exit(1);
        }
    };

    let mut event_pump = sdl_context.event_pump().unwrap();
    let start_time = Instant::now();

    'running: loop {
        unsafe {
            gl::ClearColor(0.3, 0.6, 0.3, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
        if let Err(err) = triangle.draw(&driver, start_time.elapsed().as_secs_f32()) {
            eprintln!("Draw failed: {}", err);
            break 'running;
        }

        window.gl_swap_window();

        for event in event_pump.poll_iter() {
            if let Event::Quit { .. } = event {
                break 'running;
            }
        }
        std::thread::sleep(::std::time::Duration::new(0, 1_000_000_000u32 / 60));
    }
}
