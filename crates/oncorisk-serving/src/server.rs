//! HTTP server for the risk predictor.
//!
//! This module owns the server lifecycle: it loads the artifacts, binds the
//! listener, and runs the axum router until asked to shut down.

use crate::artifacts::ArtifactStore;
use crate::config::ServerConfig;
use crate::error::{ServingError, ServingResult};
use crate::http;
use crate::service::PredictionService;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Server state enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Server is not started
    Stopped,
    /// Server is starting up
    Starting,
    /// Server is running and ready
    Running,
    /// Server is shutting down
    ShuttingDown,
    /// Server encountered an error
    Error,
}

/// Health status of the server.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Overall health status
    pub healthy: bool,

    /// Server state
    pub state: ServerState,

    /// Whether the scaler and classifier are loaded
    pub artifacts_loaded: bool,

    /// Server uptime in seconds
    pub uptime_secs: u64,

    /// Additional health details
    pub details: HashMap<String, String>,
}

/// HTTP server for the risk predictor.
///
/// # Example
///
/// ```no_run
/// use oncorisk_serving::config::ServerConfig;
/// use oncorisk_serving::server::Server;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfig::builder()
///     .host("0.0.0.0")
///     .port(8000)
///     .artifact_dir("/srv/oncorisk")
///     .build();
///
/// let server = Server::new(config);
/// server.start().await?;
///
/// // Server is now accepting requests...
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    /// Server configuration
    config: ServerConfig,

    /// Current server state
    state: Arc<RwLock<ServerState>>,

    /// Prediction service, present while running
    service: RwLock<Option<Arc<PredictionService>>>,

    /// Server start time
    start_time: RwLock<Option<Instant>>,

    /// Address the listener is bound to
    local_addr: RwLock<Option<SocketAddr>>,

    /// Shutdown signal sender
    shutdown_tx: RwLock<Option<mpsc::Sender<()>>>,

    /// Serving task
    task: Mutex<Option<JoinHandle<()>>>,

    /// Whether the server is running
    running: AtomicBool,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            service: RwLock::new(None),
            start_time: RwLock::new(None),
            local_addr: RwLock::new(None),
            shutdown_tx: RwLock::new(None),
            task: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Start the server.
    ///
    /// This method:
    /// 1. Validates the configuration
    /// 2. Loads the scaler and classifier
    /// 3. Binds the listener
    /// 4. Spawns the HTTP server
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, an artifact cannot
    /// be loaded, or the address cannot be bound. The server is left in
    /// [`ServerState::Error`] and never serves a request.
    pub async fn start(&self) -> ServingResult<()> {
        {
            let current_state = *self.state.read();
            if current_state == ServerState::Running {
                warn!("Server is already running");
                return Ok(());
            }
            if current_state == ServerState::Starting {
                return Err(ServingError::server("Server is already starting"));
            }
        }

        *self.state.write() = ServerState::Starting;
        info!("Starting cancer risk predictor server...");

        self.config.validate().map_err(|e| {
            *self.state.write() = ServerState::Error;
            ServingError::config(e.to_string())
        })?;

        info!("Loading artifacts from: {:?}", self.config.artifacts.dir);
        let store = match ArtifactStore::load(&self.config.artifacts) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                *self.state.write() = ServerState::Error;
                error!("Failed to load artifacts: {}", e);
                return Err(e);
            }
        };
        let service = Arc::new(PredictionService::new(store));

        let addr = self.config.socket_addr();
        let listener = match TcpListener::bind(addr.as_str()).await {
            Ok(listener) => listener,
            Err(e) => {
                *self.state.write() = ServerState::Error;
                error!("Failed to bind {}: {}", addr, e);
                return Err(ServingError::server(format!("Failed to bind {addr}: {e}")));
            }
        };
        let local_addr = listener.local_addr().map_err(|e| {
            *self.state.write() = ServerState::Error;
            ServingError::from(e)
        })?;

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let app = http::router(Arc::clone(&service));
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            });
            if let Err(e) = server.await {
                error!("HTTP server error: {}", e);
            }
        });

        *self.service.write() = Some(service);
        *self.shutdown_tx.write() = Some(shutdown_tx);
        *self.task.lock() = Some(handle);
        *self.local_addr.write() = Some(local_addr);
        *self.start_time.write() = Some(Instant::now());
        self.running.store(true, Ordering::SeqCst);
        *self.state.write() = ServerState::Running;

        info!("Server started on {}", local_addr);
        Ok(())
    }

    /// Stop the server gracefully.
    ///
    /// In-flight requests complete before the serving task exits.
    pub async fn stop(&self) -> ServingResult<()> {
        let current_state = *self.state.read();
        if current_state == ServerState::Stopped {
            return Ok(());
        }

        info!("Stopping server...");
        *self.state.write() = ServerState::ShuttingDown;

        let tx = self.shutdown_tx.write().take();
        if let Some(tx) = tx {
            let _ = tx.send(()).await;
        }

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Serving task ended abnormally: {}", e);
            }
        }

        *self.service.write() = None;
        *self.local_addr.write() = None;
        *self.start_time.write() = None;
        self.running.store(false, Ordering::SeqCst);
        *self.state.write() = ServerState::Stopped;

        info!("Server stopped");
        Ok(())
    }

    /// Get the current health status of the server.
    pub fn health(&self) -> HealthStatus {
        let state = *self.state.read();
        let uptime_secs = self
            .start_time
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);

        let service = self.service.read().clone();
        let artifacts_loaded = service.is_some();
        let healthy = state == ServerState::Running && artifacts_loaded;

        let mut details = HashMap::new();
        details.insert("host".to_string(), self.config.host.clone());
        details.insert("port".to_string(), self.config.port.to_string());
        details.insert("workers".to_string(), self.config.num_workers.to_string());

        if let Some(service) = service {
            let summary = service.store().summary();
            details.insert("scaler".to_string(), summary.scaler.to_string());
            details.insert("classifier".to_string(), summary.classifier.to_string());
            details.insert("estimators".to_string(), summary.estimators.to_string());
        }

        HealthStatus {
            healthy,
            state,
            artifacts_loaded,
            uptime_secs,
            details,
        }
    }

    /// Check if the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the current server state.
    pub fn state(&self) -> ServerState {
        *self.state.read()
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Address the listener is bound to (if running).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read()
    }

    /// Get the prediction service (if running).
    pub fn service(&self) -> Option<Arc<PredictionService>> {
        self.service.read().clone()
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish()
    }
}
