// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::fmt::{Debug, Formatter};

use cloudapi_core::{utils::Redact, Error, Result, SigningCredential};

/// Credential for CloudApi.
///
/// Both parts are required, the credential can't be changed once built.
#[derive(Clone)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// Returns [`cloudapi_core::ErrorKind::ArgumentInvalid`] if either part is empty.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Result<Self> {
        let access_key_id = access_key_id.into();
        if access_key_id.is_empty() {
            return Err(Error::argument_invalid("no key ID provided"));
        }

        let secret_access_key = secret_access_key.into();
        if secret_access_key.is_empty() {
            return Err(Error::argument_invalid("no secret key provided"));
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
        })
    }

    /// Access key id, sent in clear as `AccessKey`.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key, used as the HMAC key.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}
