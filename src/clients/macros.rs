// Client method generators. Declared before the client modules so they are in scope there.

/// Generates one method that sends a request over a plain `mpsc` sender and awaits the reply.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Generates `get_*`, `list_*` and `delete_*` over a `ResourceClient` field.
macro_rules! impl_client_methods {
    ($client_name:ident, $field:ident, $entity:ty, $error:ty, $name:ident, $plural:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $name>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.$field.get(id).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $plural>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.$field.list().await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $name>](&self, id: String) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.$field.delete(id).await.map_err(<$error>::from)
                }
            }
        }
    };
}

/// Generates `create_*` and `update_*` over a `ResourceClient` field.
macro_rules! impl_write_methods {
    ($client_name:ident, $field:ident, $entity:ty, $create:ty, $patch:ty, $error:ty, $name:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<create_ $name>](&self, params: $create) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.$field.create(params).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<update_ $name>](&self, id: String, patch: $patch) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.$field.update(id, patch).await.map_err(<$error>::from)
                }
            }
        }
    };
}
