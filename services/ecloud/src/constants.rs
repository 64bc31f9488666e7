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
// Env values used in cloudapi services.
pub const CLOUDAPI_ACCESS_KEY_ID: &str = "CLOUDAPI_ACCESS_KEY_ID";
pub const CLOUDAPI_SECRET_ACCESS_KEY: &str = "CLOUDAPI_SECRET_ACCESS_KEY";
pub const CLOUDAPI_ENDPOINT: &str = "CLOUDAPI_ENDPOINT";
pub const CLOUDAPI_ACCOUNT: &str = "CLOUDAPI_ACCOUNT";
pub const CLOUDAPI_CLOUDSPACE: &str = "CLOUDAPI_CLOUDSPACE";

// Headers used in cloudapi signing.
pub const X_TMRK_PREFIX: &str = "x-tmrk-";
pub const X_TMRK_AUTHORIZATION: &str = "x-tmrk-authorization";
pub const X_TMRK_ACCT: &str = "x-tmrk-acct";
pub const X_TMRK_CLOUDSPACE: &str = "x-tmrk-cloudspace";
pub const X_TMRK_DC: &str = "x-tmrk-dc";
pub const X_TMRK_NONCE: &str = "x-tmrk-nonce";
pub const X_TMRK_VERSION: &str = "x-tmrk-version";

pub const SIGNATURE_TYPE: &str = "HmacSHA256";
pub const API_VERSION: &str = "2015-05-01";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US";
pub const DEFAULT_USER_AGENT: &str = concat!("cloudapi-ecloud/", env!("CARGO_PKG_VERSION"));

// MIME types.
pub const JOB_MIME_TYPE: &str = "application/vnd.terremark.ecloud.job.v1+json";
pub const FORM_MIME_TYPE: &str = "application/x-www-form-urlencoded";

/// Maximum number of consecutive redirects before giving up.
pub const MAX_REDIRECTS: usize = 3;
