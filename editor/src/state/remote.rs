use std::{future::Future, sync::Arc};

use anyhow::Result;
use model_api::{
    actions, auth, auth::Registration, models, ApiClient, Catalog, HttpTransport, Model,
    ModelAction, User,
};
use tokio::{
    runtime::{self, Runtime},
    sync::mpsc,
};

type Client = Arc<ApiClient<HttpTransport>>;

/// The outcome of a background request.
#[derive(Debug)]
pub enum Reply {
    CurrentUser(model_api::Result<User>),
    LoggedIn(model_api::Result<User>),
    LoggedOut(model_api::Result<()>),
    Registered(model_api::Result<()>),
    Models(model_api::Result<Vec<Model>>),
    Created(model_api::Result<String>),
    Opened(model_api::Result<(Model, Catalog)>),
    Updated {
        model_id: String,
        action: ModelAction,
        result: model_api::Result<Model>,
    },
}

/// Runs api requests off the ui thread.
///
/// Every request answers with a [`Reply`] on a channel that the ui drains
/// once per frame, in arrival order.
pub struct Remote {
    runtime: Runtime,
    client: Client,
    tx: mpsc::UnboundedSender<Reply>,
    rx: mpsc::UnboundedReceiver<Reply>,
}

impl Remote {
    /// Creates a new `Remote`.
    ///
    /// # Arguments
    /// * `api_url` - The api prefix url.
    ///
    /// # Errors
    /// Returns an error if the url is unusable or the runtime can't start.
    pub fn new(api_url: &str) -> Result<Self> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("editor-remote")
            .enable_all()
            .build()?;

        let client = Arc::new(ApiClient::http(api_url)?);
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            client,
            tx,
            rx,
        })
    }

    pub fn current_user(&self) {
        self.spawn(|c| async move { Reply::CurrentUser(auth::current_user(&c).await) });
    }

    pub fn login(&self, email: String, password: String) {
        self.spawn(|c| async move { Reply::LoggedIn(auth::login(&c, &email, &password).await) });
    }

    pub fn logout(&self) {
        self.spawn(|c| async move { Reply::LoggedOut(auth::logout(&c).await) });
    }

    pub fn register(&self, registration: Registration) {
        self.spawn(|c| async move { Reply::Registered(auth::register(&c, &registration).await) });
    }

    pub fn list_models(&self) {
        self.spawn(|c| async move { Reply::Models(models::list(&c).await) });
    }

    pub fn create_model(&self, name: String) {
        self.spawn(|c| async move { Reply::Created(models::create(&c, &name).await) });
    }

    /// Fetches a model together with the catalog its page needs.
    pub fn open(&self, model_id: String) {
        self.spawn(|c| async move {
            let result = tokio::try_join!(models::fetch(&c, &model_id), Catalog::load(&c));
            Reply::Opened(result)
        });
    }

    /// Dispatches an action against `model_id`.
    pub fn update(&self, model_id: &str, action: ModelAction) {
        let model_id = model_id.to_string();
        self.spawn(|c| async move {
            let result = actions::dispatch(&c, &model_id, &action).await;
            Reply::Updated {
                model_id,
                action,
                result,
            }
        });
    }

    /// Takes every reply that arrived since the last call. Non-blocking.
    pub fn drain(&mut self) -> Vec<Reply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            replies.push(reply);
        }
        replies
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Reply> + Send + 'static,
    {
        let tx = self.tx.clone();
        let fut = job(Arc::clone(&self.client));

        self.runtime.spawn(async move {
            // The receiver only goes away when the ui shuts down.
            let _ = tx.send(fut.await);
        });
    }
}
