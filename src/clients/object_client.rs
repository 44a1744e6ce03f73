use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{StoredObject, StoredObjectCreate};
use crate::store_actor::StoreError;

/// Bucketed object storage. Keys are random and assigned on upload.
#[derive(Clone)]
pub struct ObjectClient {
    inner: ResourceClient<StoredObject>,
}

impl ObjectClient {
    pub fn new(inner: ResourceClient<StoredObject>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload(&self, bucket: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject, StoreError> {
        debug!("Sending request");
        let object = self
            .inner
            .create(StoredObjectCreate {
                bucket: bucket.to_string(),
                content_type: content_type.to_string(),
                bytes,
            })
            .await?;
        info!(key = %object.key, "Object uploaded");
        Ok(object)
    }

    #[instrument(skip(self))]
    pub async fn download(&self, key: String) -> Result<Option<StoredObject>, StoreError> {
        debug!("Sending request");
        Ok(self.inner.get(key).await?)
    }

    /// URL under which the object is served, if it exists.
    pub async fn public_url(&self, key: String) -> Result<Option<String>, StoreError> {
        Ok(self.download(key).await?.map(|object| object.public_url()))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, key: String) -> Result<(), StoreError> {
        debug!("Sending request");
        Ok(self.inner.delete(key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{uuid_ids, ResourceActor};

    #[tokio::test]
    async fn upload_then_download() {
        let (actor, inner) = ResourceActor::<StoredObject>::new(4, uuid_ids());
        tokio::spawn(actor.run());
        let objects = ObjectClient::new(inner);

        let object = objects.upload("menu-images", "image/png", vec![1, 2, 3]).await.unwrap();
        let url = objects.public_url(object.key.clone()).await.unwrap();
        assert_eq!(url, Some(format!("/storage/menu-images/{}", object.key)));

        let fetched = objects.download(object.key.clone()).await.unwrap().unwrap();
        assert_eq!(fetched.bytes, vec![1, 2, 3]);

        objects.remove(object.key.clone()).await.unwrap();
        assert_eq!(objects.public_url(object.key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let (actor, inner) = ResourceActor::<StoredObject>::new(4, uuid_ids());
        tokio::spawn(actor.run());
        let err = ObjectClient::new(inner).upload("menu-images", "image/png", Vec::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(_)));
    }
}
