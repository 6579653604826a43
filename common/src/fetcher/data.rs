use super::Error;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};

/// Data which can be extracted from a [`Response`].
#[async_trait(?Send)]
pub trait Data: Sized {
    async fn from_response(response: Response) -> Result<Self, Error>;
}

/// String data
#[async_trait(?Send)]
impl Data for String {
    async fn from_response(response: Response) -> Result<Self, Error> {
        Ok(response.error_for_status()?.text().await?)
    }
}

/// BLOB data
#[async_trait(?Send)]
impl Data for Bytes {
    async fn from_response(response: Response) -> Result<Self, Error> {
        Ok(response.error_for_status()?.bytes().await?)
    }
}

/// A new-type wrapping [`String`].
pub struct Text(pub String);

#[async_trait(?Send)]
impl Data for Text {
    async fn from_response(response: Response) -> Result<Self, Error> {
        Ok(response.error_for_status()?.text().await.map(Self)?)
    }
}

impl Text {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Text {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Text {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// XML based data.
#[derive(Clone)]
pub struct Xml<D>(pub D)
where
    D: DeserializeOwned;

#[async_trait(?Send)]
impl<D> Data for Xml<D>
where
    D: DeserializeOwned,
{
    async fn from_response(response: Response) -> Result<Self, Error> {
        let text = response.error_for_status()?.text().await?;
        Ok(Self(quick_xml::de::from_str(&text)?))
    }
}

impl<D: DeserializeOwned> Xml<D> {
    #[inline]
    pub fn into_inner(self) -> D {
        self.0
    }
}

impl<D: DeserializeOwned> Deref for Xml<D> {
    type Target = D;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<D: DeserializeOwned> DerefMut for Xml<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
