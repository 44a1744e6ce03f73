//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to script the backend's replies.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::actor_framework::{Entity, Filter, FrameworkError, ResourceClient, ResourceRequest};

pub type Reply<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Orchestration code such as checkout or staff creation talks to several tables.
/// Instead of a real `ResourceActor`, each table is backed by a channel the test
/// controls: the test reads the request, asserts on it, and sends whatever reply
/// (success, rejection, dropped actor) the scenario needs. Nothing arrives that the
/// test did not see, so "no backend call was made" is checked with `try_recv`.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (changes, _) = broadcast::channel(buffer_size.max(1));
    (ResourceClient::new(sender, changes), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request. The filter is handed
/// back so the test can apply it to the rows it replies with.
pub async fn expect_query<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(Filter<T>, Reply<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Query { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Reply<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CategoryCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Category>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(CategoryCreate { name: "Coffee".to_string(), sort_order: 1 })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Coffee");
        let category = Category {
            id: "cat_1".to_string(),
            name: payload.name,
            sort_order: payload.sort_order,
            active: true,
        };
        responder.send(Ok(category.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(category));
    }

    #[tokio::test]
    async fn query_filter_is_handed_back() {
        let (client, mut receiver) = create_mock_client::<Category>(10);
        let task = tokio::spawn(async move { client.query(|category| category.active).await });

        let (filter, responder) = expect_query(&mut receiver).await.expect("Expected Query request");
        let rows = vec![
            Category { id: "a".into(), name: "A".into(), sort_order: 0, active: true },
            Category { id: "b".into(), name: "B".into(), sort_order: 1, active: false },
        ];
        let matching: Vec<_> = rows.into_iter().filter(|row| filter(row)).collect();
        responder.send(Ok(matching)).unwrap();

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }
}
