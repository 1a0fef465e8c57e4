//! Contract documents for tests across the Ariadne workspace.
//!
//! # Example
//!
//! ```
//! use ariadne_core::{fixtures, Contract};
//!
//! let contract = Contract::from_document(fixtures::petstore()).unwrap();
//! assert!(contract.get_operation("getPetById").is_some());
//! ```

use serde_json::{json, Value};

/// A pet store contract exercising every parameter location, body
/// negotiation and patterned responses.
///
/// Operations, in declaration order:
/// - `getPets` - GET /pets
/// - `createPet` - POST /pets
/// - `getPetById` - GET /pets/{id}
/// - `replacePetById` - PUT /pets/{id}
/// - `deletePetById` - DELETE /pets/{id}
/// - `getPetsMeta` - GET /pets/meta
/// - `getOwnerByPetId` - GET /pets/{id}/owner
/// - `getPetHistory` - GET /pets/{id}/history
#[must_use]
pub fn petstore() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "pet store", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "getPets",
                    "tags": ["pets"],
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                        { "name": "tag", "in": "query", "schema": { "type": "array", "items": { "type": "string" } } },
                        { "name": "X-Request-Id", "in": "header", "schema": { "type": "string" } },
                        { "name": "session", "in": "cookie", "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "pets",
                            "headers": {
                                "X-Total-Count": { "required": true, "schema": { "type": "integer" } },
                                "X-Rate-Limit": { "schema": { "type": "integer" } }
                            },
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } },
                                    "examples": {
                                        "garfield": { "value": [{ "id": 1, "name": "Garfield" }] },
                                        "odie": { "value": [{ "id": 2, "name": "Odie" }] }
                                    }
                                }
                            }
                        },
                        "401": { "description": "unauthorized" },
                        "4XX": {
                            "description": "client error",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
                        },
                        "400": {
                            "description": "bad request",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "required": ["errors"],
                                        "properties": { "errors": { "type": "array" } }
                                    }
                                }
                            }
                        },
                        "default": {
                            "description": "unexpected",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
                        }
                    }
                },
                "post": {
                    "operationId": "createPet",
                    "tags": ["pets"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/PetPayload" } }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "created",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Pet" },
                                    "example": { "id": 3, "name": "Nermal" }
                                }
                            }
                        }
                    }
                }
            },
            "/pets/{id}": {
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "integer", "minimum": 0 } }
                ],
                "get": {
                    "operationId": "getPetById",
                    "responses": {
                        "200": {
                            "description": "a pet",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                        },
                        "404": {
                            "description": "missing",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
                        }
                    }
                },
                "put": {
                    "operationId": "replacePetById",
                    "requestBody": {
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/PetPayload" } },
                            "text/plain": { "schema": { "type": "string" } }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "replaced",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                        }
                    }
                },
                "delete": {
                    "operationId": "deletePetById",
                    "responses": { "204": { "description": "deleted" } }
                }
            },
            "/pets/meta": {
                "get": {
                    "operationId": "getPetsMeta",
                    "responses": {
                        "200": {
                            "description": "meta",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "count": { "type": "integer" } }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/pets/{id}/owner": {
                "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "integer", "minimum": 0 } }
                ],
                "get": {
                    "operationId": "getOwnerByPetId",
                    "responses": {
                        "200": {
                            "description": "owner",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Owner" } } }
                        }
                    }
                }
            },
            "/pets/{id}/history": {
                "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "integer", "minimum": 0 } }
                ],
                "get": {
                    "operationId": "getPetHistory",
                    "parameters": [
                        { "name": "since", "in": "query", "schema": { "type": "string", "format": "date" } },
                        { "name": "verbose", "in": "query", "schema": { "type": "boolean" } },
                        {
                            "name": "filter",
                            "in": "query",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "kind": { "type": "string" } },
                                        "additionalProperties": { "type": "string" }
                                    }
                                }
                            }
                        },
                        { "name": "x-api-version", "in": "header", "required": true, "schema": { "type": "integer" } }
                    ],
                    "responses": {
                        "2XX": {
                            "description": "history",
                            "content": { "application/json": { "schema": { "type": "array" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {
                        "id": { "type": "integer", "minimum": 0 },
                        "name": { "type": "string" },
                        "tag": { "type": "string", "nullable": true }
                    }
                },
                "PetPayload": {
                    "type": "object",
                    "required": ["name"],
                    "additionalProperties": false,
                    "properties": {
                        "name": { "type": "string" },
                        "age": { "type": "integer" }
                    }
                },
                "Owner": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "email": { "type": "string", "format": "email" }
                    }
                },
                "Error": {
                    "type": "object",
                    "required": ["message"],
                    "properties": {
                        "code": { "type": "integer" },
                        "message": { "type": "string" }
                    }
                }
            }
        }
    })
}

/// A contract whose operations carry security requirements.
///
/// - `getPets` inherits the global `basicAuth` requirement.
/// - `getPetById` accepts `bearerAuth`, or `apiKey` together with `basicAuth`.
/// - `getHealth` opts out with an empty requirement list.
#[must_use]
pub fn secured() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "secured", "version": "1.0.0" },
        "security": [{ "basicAuth": [] }],
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "getPets",
                    "responses": { "200": { "description": "pets" } }
                }
            },
            "/pets/{id}": {
                "get": {
                    "operationId": "getPetById",
                    "parameters": [
                        { "name": "id", "in": "path", "schema": { "type": "integer" } }
                    ],
                    "security": [{ "bearerAuth": [] }, { "apiKey": [], "basicAuth": [] }],
                    "responses": { "200": { "description": "a pet" } }
                }
            },
            "/health": {
                "get": {
                    "operationId": "getHealth",
                    "security": [],
                    "responses": { "200": { "description": "ok" } }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "basicAuth": { "type": "http", "scheme": "basic" },
                "bearerAuth": { "type": "http", "scheme": "bearer" },
                "apiKey": { "type": "apiKey", "in": "header", "name": "x-api-key" }
            }
        }
    })
}

/// A contract with self-referential and mutually recursive schemas.
///
/// `createTree` takes and returns a `Node` whose children are `Node`s.
/// `getPerson` returns a `Person` whose `employer` is a `Company` whose
/// `employees` are `Person`s.
#[must_use]
pub fn recursive() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "recursive", "version": "1.0.0" },
        "paths": {
            "/trees": {
                "post": {
                    "operationId": "createTree",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Node" } } }
                    },
                    "responses": {
                        "200": {
                            "description": "tree",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Node" } } }
                        }
                    }
                }
            },
            "/people/{id}": {
                "get": {
                    "operationId": "getPerson",
                    "parameters": [{ "name": "id", "in": "path", "schema": { "type": "string" } }],
                    "responses": {
                        "200": {
                            "description": "person",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Person" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Node": {
                    "type": "object",
                    "required": ["value"],
                    "properties": {
                        "value": { "type": "integer" },
                        "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } }
                    }
                },
                "Person": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "employer": { "$ref": "#/components/schemas/Company" }
                    }
                },
                "Company": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "employees": { "type": "array", "items": { "$ref": "#/components/schemas/Person" } }
                    }
                }
            }
        }
    })
}

/// A single `GET /pets` operation with an array `limit` query parameter
/// declared with the given serialization style and explode flag.
#[must_use]
pub fn styled_query(style: &str, explode: bool) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "styles", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "getPets",
                    "parameters": [{
                        "name": "limit",
                        "in": "query",
                        "style": style,
                        "explode": explode,
                        "schema": { "type": "array", "items": { "type": "integer" } }
                    }],
                    "responses": { "200": { "description": "pets" } }
                }
            }
        }
    })
}

/// A `GET /pets` operation with an integer `limit` and a free-form object
/// `meta` query parameter.
#[must_use]
pub fn free_form_query() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "free-form", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "searchPets",
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                        {
                            "name": "meta",
                            "in": "query",
                            "schema": { "type": "object", "additionalProperties": true }
                        }
                    ],
                    "responses": { "200": { "description": "pets" } }
                }
            }
        }
    })
}

/// An OpenAPI 3.1 contract using JSON-Schema 2020-12 type unions.
#[must_use]
pub fn openapi_31() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": { "title": "modern", "version": "1.0.0" },
        "paths": {
            "/notes": {
                "post": {
                    "operationId": "createNote",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": ["text"],
                                    "properties": {
                                        "text": { "type": "string" },
                                        "archivedAt": { "type": ["string", "null"] },
                                        "priority": { "type": "integer", "exclusiveMinimum": 0 }
                                    }
                                }
                            }
                        }
                    },
                    "responses": { "204": { "description": "stored" } }
                }
            }
        }
    })
}
