use std::sync::Arc;

use crate::model::ModelLoader;
use crate::recommender::Recommender;
use crate::table::TableSource;

pub struct HandlerState<L: ModelLoader + 'static, S: TableSource + 'static> {
    pub recommender: Arc<Recommender<L, S>>,

    /// Records returned when a request omits `n`.
    pub default_n: usize,

    /// Largest `n` a request may ask for.
    pub max_n: usize,
}

impl<L: ModelLoader + 'static, S: TableSource + 'static> Clone for HandlerState<L, S> {
    fn clone(&self) -> Self {
        Self {
            recommender: Arc::clone(&self.recommender),
            default_n: self.default_n,
            max_n: self.max_n,
        }
    }
}

impl<L: ModelLoader + 'static, S: TableSource + 'static> HandlerState<L, S> {
    pub fn new(recommender: Arc<Recommender<L, S>>) -> Self {
        let default_n = recommender.default_n();
        let max_n = recommender.max_n();
        Self {
            recommender,
            default_n,
            max_n,
        }
    }
}
