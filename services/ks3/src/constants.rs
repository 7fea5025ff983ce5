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

// Env values used in ks3 services.
pub const KS3_ACCESS_KEY_ID: &str = "KS3_ACCESS_KEY_ID";
pub const KS3_SECRET_ACCESS_KEY: &str = "KS3_SECRET_ACCESS_KEY";
pub const KS3_ENDPOINT: &str = "KS3_ENDPOINT";

/// Default endpoint host of the service.
pub const KS3_HOSTNAME: &str = "kss.ksyun.com";

/// Scheme used in the `Authorization` header.
pub const AUTH_SCHEME: &str = "KSS";

// Headers used in ks3 services.
pub const CONTENT_MD5: &str = "content-md5";
pub const KS3_PREFIX: &str = "x-kss-";
pub const KS3_ALTERNATE_DATE: &str = "x-kss-date";
pub const KS3_USER_METADATA_PREFIX: &str = "x-kss-meta-";
pub const KS3_REQUEST_ID: &str = "x-kss-request-id";

/// Content type applied when the caller set none.
pub const DEFAULT_MIMETYPE: &str = "application/octet-stream";

// Query parameters of pre-signed urls.
pub const PARAM_ACCESS_KEY_ID: &str = "AccessKeyId";
pub const PARAM_EXPIRES: &str = "Expires";
pub const PARAM_SIGNATURE: &str = "Signature";

/// Attempts of one call, including the first one.
pub const RETRY_TIMES: usize = 3;
