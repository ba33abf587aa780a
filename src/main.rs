// Room Desk Application
// Main entry point

use room_desk::ui_egui::RoomDeskApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Room Desk");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0])
            .with_title("Room Desk"),
        ..Default::default()
    };

    eframe::run_native(
        "Room Desk",
        options,
        Box::new(|cc| Ok(Box::new(RoomDeskApp::new(cc)?))),
    )
}
