//! Session runtime
//!
//! A `Session` is the single task that owns the [`AppController`] and the
//! [`MapView`]. Commands from the web layer and results from spawned fetch
//! tasks arrive on one channel and are applied strictly one at a time. After
//! each event a complete [`SessionView`] is published on a watch channel, so
//! subscribers never see a half-applied transition.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::RoadwatchError;
use crate::controller::{AppController, Effect};
use crate::error::{GeocodeError, RouteError, WeatherError};
use crate::geocoding::GeocodingClient;
use crate::hotspots::{HOTSPOTS, HotspotPanel};
use crate::location::{LocationOutcome, LocationProvider};
use crate::map_view::{MapScene, MapView, RouteRequest};
use crate::models::{AccidentHotspot, ApplicationState, Coordinate, RouteResult, WeatherSnapshot};
use crate::routing::RoutingClient;
use crate::ticket::Ticket;
use crate::weather::WeatherClient;

const EVENT_BUFFER: usize = 64;

/// The external capabilities a session drives
#[derive(Clone)]
pub struct Clients {
    pub location: Arc<dyn LocationProvider>,
    pub geocoding: Arc<dyn GeocodingClient>,
    pub weather: Arc<dyn WeatherClient>,
    pub routing: Arc<dyn RoutingClient>,
}

/// Everything a renderer needs, published after every applied event
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Increases by one per applied event
    pub revision: u64,
    pub state: ApplicationState,
    pub scene: MapScene,
    pub hotspots: HotspotPanel,
}

#[derive(Debug)]
enum Event {
    Mount,
    Search(String),
    SetZoom {
        zoom: u8,
        reply: oneshot::Sender<crate::Result<()>>,
    },
    Located {
        ticket: Ticket,
        outcome: LocationOutcome,
    },
    Geocoded {
        ticket: Ticket,
        query: String,
        result: Result<Coordinate, GeocodeError>,
    },
    WeatherFetched {
        ticket: Ticket,
        result: Result<WeatherSnapshot, WeatherError>,
    },
    RouteFetched {
        ticket: Ticket,
        result: Result<RouteResult, RouteError>,
    },
}

/// Cloneable handle used to drive and observe a running session
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<Event>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    /// A page was (re)loaded: start over from the default state and ask for
    /// the user's position again.
    pub async fn mount(&self) -> crate::Result<()> {
        self.send(Event::Mount).await
    }

    /// Submit a search. Blank queries are accepted and ignored by the session.
    pub async fn search(&self, query: impl Into<String>) -> crate::Result<()> {
        self.send(Event::Search(query.into())).await
    }

    /// Applied before returning, so an out-of-range zoom is reported here
    pub async fn set_zoom(&self, zoom: u8) -> crate::Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Event::SetZoom { zoom, reply }).await?;
        response.await.map_err(|_| session_stopped())?
    }

    #[must_use]
    pub fn current_view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    async fn send(&self, event: Event) -> crate::Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| session_stopped())
    }
}

fn session_stopped() -> RoadwatchError {
    RoadwatchError::general("The map session has stopped")
}

pub struct Session {
    controller: AppController,
    map_view: MapView,
    clients: Clients,
    hotspots: &'static [AccidentHotspot],
    events: mpsc::WeakSender<Event>,
    inbox: mpsc::Receiver<Event>,
    view: watch::Sender<SessionView>,
    revision: u64,
}

impl Session {
    pub fn new(
        clients: Clients,
        default_center: Coordinate,
        zoom: u8,
    ) -> crate::Result<(Self, SessionHandle)> {
        let (events, inbox) = mpsc::channel(EVENT_BUFFER);
        let controller = AppController::new(default_center);
        let map_view = MapView::new(zoom)?;
        let hotspots: &'static [AccidentHotspot] = HOTSPOTS.as_slice();

        let initial = render(0, controller.state(), &map_view, hotspots);
        let (view, view_receiver) = watch::channel(initial);

        let session = Self {
            controller,
            map_view,
            clients,
            hotspots,
            events: events.downgrade(),
            inbox,
            view,
            revision: 0,
        };
        let handle = SessionHandle {
            events,
            view: view_receiver,
        };
        Ok((session, handle))
    }

    /// Run until every handle is dropped and no fetch is in flight
    pub async fn run(mut self) {
        info!("Map session started");
        let effects = self.controller.mount();
        self.execute(effects);

        while let Some(event) = self.inbox.recv().await {
            debug!("Applying {:?}", event);
            self.apply(event);
            self.publish();
        }

        info!("Map session stopped");
    }

    fn apply(&mut self, event: Event) {
        let effects = match event {
            Event::Mount => {
                self.map_view.reset_zoom();
                self.controller.mount()
            }
            Event::Search(query) => self.controller.submit_search(&query),
            Event::SetZoom { zoom, reply } => {
                let result = self.map_view.set_zoom(zoom);
                if let Err(e) = &result {
                    warn!("Ignoring zoom change: {}", e);
                }
                if reply.send(result).is_err() {
                    debug!("Zoom requester went away");
                }
                Vec::new()
            }
            Event::Located { ticket, outcome } => match outcome {
                Ok(coordinate) => self.controller.location_resolved(ticket, coordinate),
                Err(error) => {
                    self.controller.location_failed(ticket, error);
                    Vec::new()
                }
            },
            Event::Geocoded {
                ticket,
                query,
                result,
            } => match result {
                Ok(coordinate) => self.controller.geocode_resolved(ticket, query, coordinate),
                Err(error) => {
                    self.controller.geocode_failed(ticket, &error);
                    Vec::new()
                }
            },
            Event::WeatherFetched { ticket, result } => {
                match result {
                    Ok(snapshot) => self.controller.weather_resolved(ticket, snapshot),
                    Err(error) => self.controller.weather_failed(ticket, &error),
                };
                Vec::new()
            }
            Event::RouteFetched { ticket, result } => {
                match result {
                    Ok(route) => {
                        self.map_view.route_resolved(ticket, route);
                    }
                    Err(error) => self.map_view.route_failed(ticket, &error),
                }
                Vec::new()
            }
        };

        self.execute(effects);

        if let Some(request) = self.map_view.reconcile(self.controller.state()) {
            self.fetch_route(request);
        }
    }

    fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RequestLocation { ticket } => {
                    let provider = Arc::clone(&self.clients.location);
                    self.spawn(async move {
                        let outcome = provider.request_current_location().await;
                        Event::Located { ticket, outcome }
                    });
                }
                Effect::Geocode { ticket, query } => {
                    let client = Arc::clone(&self.clients.geocoding);
                    self.spawn(async move {
                        let result = client.geocode(&query).await;
                        Event::Geocoded {
                            ticket,
                            query,
                            result,
                        }
                    });
                }
                Effect::FetchWeather { ticket, coordinate } => {
                    let client = Arc::clone(&self.clients.weather);
                    self.spawn(async move {
                        let result = client.fetch_weather(coordinate).await;
                        Event::WeatherFetched { ticket, result }
                    });
                }
            }
        }
    }

    fn fetch_route(&self, request: RouteRequest) {
        let client = Arc::clone(&self.clients.routing);
        self.spawn(async move {
            let result = client
                .fetch_route(request.origin, request.destination)
                .await;
            Event::RouteFetched {
                ticket: request.ticket,
                result,
            }
        });
    }

    /// Run a fetch off the session task and feed its result back as an event
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let Some(events) = self.events.upgrade() else {
            debug!("Session is shutting down; not starting a new request");
            return;
        };
        tokio::spawn(async move {
            let event = task.await;
            if events.send(event).await.is_err() {
                debug!("Session closed before a result arrived");
            }
        });
    }

    fn publish(&mut self) {
        self.revision += 1;
        let view = render(
            self.revision,
            self.controller.state(),
            &self.map_view,
            self.hotspots,
        );
        self.view.send_replace(view);
    }
}

fn render(
    revision: u64,
    state: &ApplicationState,
    map_view: &MapView,
    hotspots: &[AccidentHotspot],
) -> SessionView {
    SessionView {
        revision,
        state: state.clone(),
        scene: map_view.scene(state),
        hotspots: HotspotPanel::render(hotspots, state.user_location),
    }
}
