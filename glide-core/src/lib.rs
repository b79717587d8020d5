pub mod report;
pub mod session;

pub use report::generate_session_report;
pub use session::{NavEventCallback, Session, SessionOptions, extract_url_path};

pub fn print_banner() {
    println!(
        r#"
     ██████╗ ██╗     ██╗██████╗ ███████╗
    ██╔════╝ ██║     ██║██╔══██╗██╔════╝
    ██║  ███╗██║     ██║██║  ██║█████╗
    ██║   ██║██║     ██║██║  ██║██╔══╝
    ╚██████╔╝███████╗██║██████╔╝███████╗
     ╚═════╝ ╚══════╝╚═╝╚═════╝ ╚══════╝
      soft navigation for dashboards v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
