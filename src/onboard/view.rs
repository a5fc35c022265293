use console::style;

use crate::config::RunConfig;
use crate::ui::style as ui;

pub fn print_welcome_banner() {
    println!();
    println!("  {}", style(t!("onboard.banner.welcome")).white().bold());
    println!("  {}", style(t!("onboard.banner.subtitle")).dim());
    println!();
}

pub fn print_bullet(text: &str) {
    println!("  {} {}", style("›").cyan(), text);
}

pub fn print_summary(config: &RunConfig) {
    println!();
    println!("  {}", ui::accent("━".repeat(50)));
    println!("  ◆  {}", ui::header(t!("onboard.summary.ready")));
    println!("  {}", ui::accent("━".repeat(50)));
    println!();

    println!("  {}", ui::dim(t!("onboard.summary.config_saved")));
    println!("    {}", ui::value(config.config_path.display()));
    println!();

    println!("  {}", ui::header(t!("onboard.summary.quick_summary")));
    println!("    › {} {}", t!("onboard.summary.sender"), config.email);
    println!(
        "    › {} {}",
        t!("onboard.summary.recipients"),
        config.recipient_list().join(", ")
    );
    println!("    › {} {}", t!("onboard.summary.task"), config.task_name);
    println!(
        "    › {} {}:{}",
        t!("onboard.summary.server"),
        config.smtp_server,
        config.port
    );
    println!(
        "    › {} {}",
        t!("onboard.summary.reports"),
        config.report_interval()
    );
    println!(
        "    › {} {}",
        t!("onboard.summary.start_mail"),
        if config.send_start {
            ui::value(t!("onboard.summary.on"))
        } else {
            ui::yellow(t!("onboard.summary.off"))
        }
    );
    println!();
    println!("  {}", ui::dim(t!("onboard.summary.password_note")));
    println!();
}
