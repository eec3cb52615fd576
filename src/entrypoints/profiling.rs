#[cfg(feature = "profiling")]
pub struct ProfilingServer {
    server: Option<puffin_http::Server>,
}

#[cfg(feature = "profiling")]
impl ProfilingServer {
    pub fn start() -> Self {
        puffin::set_scopes_on(true); // tell puffin to collect data

        match puffin_http::Server::new("127.0.0.1:8585") {
            Ok(puffin_server) => {
                tracing::info!(
                    "Profiling enabled, to view: cargo install puffin_viewer && ~/.cargo/bin/puffin_viewer --url 127.0.0.1:8585"
                );

                ProfilingServer {
                    server: Some(puffin_server),
                }
            }
            Err(err) => {
                tracing::error!("Failed to start puffin server: {err}");
                ProfilingServer { server: None }
            }
        }
    }

    pub fn stop(&mut self) {
        puffin::set_scopes_on(false);
        // Dropping the server will close it.
        self.server = None;
    }
}

pub fn profiling_ui(ui: &mut egui::Ui) {
    #[cfg(feature = "profiling")]
    {
        egui::warn_if_debug_build(ui);
        use egui::widgets::Checkbox;
        use std::sync::Mutex;

        // Server handle shared by every invocation of this panel
        static PROFILING_SERVER: Mutex<Option<ProfilingServer>> = Mutex::new(None);

        let Ok(mut server) = PROFILING_SERVER.lock() else {
            ui.label("Profiling server state is unavailable.");
            return;
        };

        let mut enabled = server.is_some();
        if ui
            .add(Checkbox::new(&mut enabled, "Enable Profiling Server"))
            .changed()
        {
            if enabled {
                if server.is_none() {
                    *server = Some(ProfilingServer::start());
                }
            } else {
                if let Some(srv) = server.as_mut() {
                    srv.stop();
                }
                *server = None;
            }
        }
    }
    #[cfg(not(feature = "profiling"))]
    {
        ui.label("Profiling feature is disabled in this build.");
    }
}
